//! # The remote space capability
//!
//! [`SpaceHost`] is the complete surface the snapshot engine needs from a
//! remote community-space service: bulk reads of every entity collection,
//! backward message paging, and per-entity create/edit/delete calls. The
//! engine is generic over this trait and never speaks a wire protocol
//! itself.
//!
//! Every write may fail with [`HostError::CapabilityDenied`],
//! [`HostError::NotFound`], or [`HostError::RateLimited`]; callers are
//! expected to treat those as retryable or skippable per entity.

use bytes::Bytes;

use crate::{
    Result,
    types::{
        CreateChannel, DefaultRolePatch, LiveBan, LiveChannel, LiveEmoji, LiveIntegration,
        LiveMessage, LiveRole, LiveThread, LiveWebhook, NewRole, NewThread, OutboundMessage,
        ImagePayload, ResolvedOverwrite, SpaceProfile, SpaceSetting,
    },
};

/// Capability interface to a remote community-space host.
///
/// Implementations are expected to be cheap to call concurrently from a
/// single task; the engine fans out many in-flight calls and awaits them
/// jointly, relying on the host to enforce its own uniqueness, ordering,
/// and rate limits.
#[allow(async_fn_in_trait)]
pub trait SpaceHost {
    // ------------------------------------------------------------------
    // reads
    // ------------------------------------------------------------------

    /// Fetches the space metadata.
    ///
    /// # Errors
    /// - [`HostError::NotFound`](crate::error::HostError::NotFound) if the
    ///   space cannot be resolved. This is the one failure the engine
    ///   treats as fatal for a whole capture or restore.
    async fn space_profile(&self, space_id: &str) -> Result<SpaceProfile>;

    /// Lists every role in the space, including managed and default roles.
    async fn list_roles(&self, space_id: &str) -> Result<Vec<LiveRole>>;

    /// Lists every channel in the space, categories included, in no
    /// guaranteed order.
    async fn list_channels(&self, space_id: &str) -> Result<Vec<LiveChannel>>;

    /// Lists the active threads under a text channel.
    async fn list_threads(&self, space_id: &str, channel_id: &str) -> Result<Vec<LiveThread>>;

    async fn list_emojis(&self, space_id: &str) -> Result<Vec<LiveEmoji>>;

    async fn list_bans(&self, space_id: &str) -> Result<Vec<LiveBan>>;

    async fn list_webhooks(&self, space_id: &str) -> Result<Vec<LiveWebhook>>;

    async fn list_integrations(&self, space_id: &str) -> Result<Vec<LiveIntegration>>;

    /// Fetches one page of messages, newest first, strictly older than
    /// `before` when given. `channel_id` may name a channel or a thread.
    async fn message_page(
        &self,
        space_id: &str,
        channel_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<LiveMessage>>;

    /// Downloads an image by URL, for embedding binary payloads into a
    /// snapshot.
    async fn fetch_image(&self, url: &str) -> Result<Bytes>;

    // ------------------------------------------------------------------
    // writes
    // ------------------------------------------------------------------

    async fn create_role(&self, space_id: &str, role: NewRole) -> Result<LiveRole>;

    /// Edits the space's default (everyone) role in place.
    async fn edit_default_role(&self, space_id: &str, patch: DefaultRolePatch) -> Result<LiveRole>;

    async fn delete_role(&self, space_id: &str, role_id: &str) -> Result<()>;

    /// Creates a channel or category and returns its live form.
    async fn create_channel(&self, space_id: &str, request: CreateChannel) -> Result<LiveChannel>;

    async fn delete_channel(&self, space_id: &str, channel_id: &str) -> Result<()>;

    /// Replaces the full overwrite set on a channel or category.
    async fn set_overwrites(
        &self,
        space_id: &str,
        channel_id: &str,
        overwrites: Vec<ResolvedOverwrite>,
    ) -> Result<()>;

    async fn create_thread(
        &self,
        space_id: &str,
        channel_id: &str,
        thread: NewThread,
    ) -> Result<LiveThread>;

    async fn create_emoji(
        &self,
        space_id: &str,
        name: &str,
        image: ImagePayload,
    ) -> Result<LiveEmoji>;

    async fn delete_emoji(&self, space_id: &str, emoji_id: &str) -> Result<()>;

    async fn ban(&self, space_id: &str, user_id: &str, reason: Option<&str>) -> Result<()>;

    async fn unban(&self, space_id: &str, user_id: &str) -> Result<()>;

    async fn delete_integration(&self, space_id: &str, integration_id: &str) -> Result<()>;

    /// Creates an outbound-message proxy on a channel or thread.
    async fn create_webhook(
        &self,
        space_id: &str,
        channel_id: &str,
        name: &str,
    ) -> Result<LiveWebhook>;

    async fn delete_webhook(&self, space_id: &str, webhook_id: &str) -> Result<()>;

    /// Sends a message through a proxy under the given display identity and
    /// returns the stored message.
    async fn send_webhook_message(
        &self,
        space_id: &str,
        webhook_id: &str,
        message: OutboundMessage,
    ) -> Result<LiveMessage>;

    async fn pin_message(&self, space_id: &str, channel_id: &str, message_id: &str) -> Result<()>;

    /// Applies one space-metadata edit.
    async fn apply_setting(&self, space_id: &str, setting: SpaceSetting) -> Result<()>;
}
