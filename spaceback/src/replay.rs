//! Message replay through a temporary impersonation proxy.

use space_host::{OutboundAttachment, OutboundMessage, SpaceHost};
use tracing::{debug, warn};

use crate::snapshot::{ImageRef, MessageRecord};

/// Display name of the temporary proxy. Visible only while a replay is in
/// flight; the proxy is torn down afterwards.
const PROXY_NAME: &str = "message-replay";

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ReplayStats {
    pub sent: usize,
    pub failed: usize,
}

/// Replays a captured message list into a channel or thread.
///
/// Creates a proxy scoped to the destination, drops messages that carry
/// nothing sendable, keeps the most recent `cap` of the chronological
/// list, and sends strictly sequentially under each recorded author's
/// display identity, re-pinning what was pinned at capture. Individual
/// send failures are logged and skipped; proxy teardown is best-effort.
pub(crate) async fn replay_messages<H: SpaceHost>(
    host: &H,
    space_id: &str,
    channel_id: &str,
    channel_name: &str,
    messages: &[MessageRecord],
    cap: usize,
) -> ReplayStats {
    let mut stats = ReplayStats::default();
    let sendable: Vec<&MessageRecord> = messages
        .iter()
        .filter(|message| !message.is_empty())
        .collect();
    let kept = &sendable[sendable.len().saturating_sub(cap)..];
    if kept.is_empty() {
        return stats;
    }

    let proxy = match host.create_webhook(space_id, channel_id, PROXY_NAME).await {
        Ok(proxy) => proxy,
        Err(err) => {
            warn!(channel = channel_name, error = %err, "proxy creation failed, skipping replay");
            stats.failed = kept.len();
            return stats;
        }
    };

    for message in kept {
        let outbound = OutboundMessage {
            author_name: message.author_name.clone(),
            author_avatar_url: message.author_avatar_url.clone(),
            content: message.content.clone(),
            embeds: message.embeds.clone(),
            attachments: message
                .attachments
                .iter()
                .map(|attachment| OutboundAttachment {
                    name: attachment.name.clone(),
                    content: match &attachment.content {
                        ImageRef::Url(url) => url.clone(),
                        ImageRef::Embedded(payload) => payload.clone(),
                    },
                })
                .collect(),
        };
        match host
            .send_webhook_message(space_id, &proxy.id, outbound)
            .await
        {
            Ok(sent) => {
                stats.sent += 1;
                if message.pinned
                    && let Err(err) = host.pin_message(space_id, channel_id, &sent.id).await
                {
                    warn!(channel = channel_name, error = %err, "re-pin failed");
                }
            }
            Err(err) => {
                stats.failed += 1;
                warn!(channel = channel_name, error = %err, "message send failed, continuing");
            }
        }
    }

    if let Err(err) = host.delete_webhook(space_id, &proxy.id).await {
        debug!(channel = channel_name, error = %err, "proxy teardown failed");
    }
    stats
}
