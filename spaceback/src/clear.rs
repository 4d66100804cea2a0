//! Pre-restore wipe of a target space. Destructive, best-effort.

use futures::future::join_all;
use space_host::{
    ExplicitContentFilter, HostError, NotificationLevel, SpaceFeature, SpaceHost, SpaceSetting,
    VerificationLevel,
};
use tracing::{info, warn};

/// AFK timeout the baseline reset applies, in seconds.
const BASELINE_AFK_TIMEOUT_SECS: u32 = 300;

/// Deletes every non-managed editable role (except the default role),
/// every channel, emoji, webhook, and integration, revokes every ban,
/// then resets space settings to a safe baseline. Every deletion is
/// independently caught; one failure never blocks the rest.
///
/// The only hard failure is a space profile that cannot be fetched, since
/// the baseline reset depends on it.
pub(crate) async fn clear_space<H: SpaceHost>(host: &H, space_id: &str) -> Result<(), HostError> {
    let profile = host.space_profile(space_id).await?;

    if let Ok(roles) = host.list_roles(space_id).await {
        let deletions = roles
            .iter()
            .filter(|role| !role.managed && role.editable && role.id != space_id)
            .map(|role| async move {
                (role.name.clone(), host.delete_role(space_id, &role.id).await)
            });
        log_failures("role", join_all(deletions).await);
    }

    if let Ok(channels) = host.list_channels(space_id).await {
        let deletions = channels.iter().map(|channel| async move {
            (
                channel.name.clone(),
                host.delete_channel(space_id, &channel.id).await,
            )
        });
        log_failures("channel", join_all(deletions).await);
    }

    if let Ok(emojis) = host.list_emojis(space_id).await {
        let deletions = emojis.iter().map(|emoji| async move {
            (emoji.name.clone(), host.delete_emoji(space_id, &emoji.id).await)
        });
        log_failures("emoji", join_all(deletions).await);
    }

    if let Ok(webhooks) = host.list_webhooks(space_id).await {
        let deletions = webhooks.iter().map(|hook| async move {
            (hook.name.clone(), host.delete_webhook(space_id, &hook.id).await)
        });
        log_failures("webhook", join_all(deletions).await);
    }

    if let Ok(bans) = host.list_bans(space_id).await {
        let revocations = bans.iter().map(|ban| async move {
            (ban.user_id.clone(), host.unban(space_id, &ban.user_id).await)
        });
        log_failures("ban", join_all(revocations).await);
    }

    if let Ok(integrations) = host.list_integrations(space_id).await {
        let deletions = integrations.iter().map(|integration| async move {
            (
                integration.name.clone(),
                host.delete_integration(space_id, &integration.id).await,
            )
        });
        log_failures("integration", join_all(deletions).await);
    }

    let mut resets = vec![
        SpaceSetting::AfkChannel(None),
        SpaceSetting::AfkTimeoutSecs(BASELINE_AFK_TIMEOUT_SECS),
        SpaceSetting::Icon(None),
        SpaceSetting::Banner(None),
        SpaceSetting::Splash(None),
        SpaceSetting::DefaultNotifications(NotificationLevel::OnlyMentions),
        SpaceSetting::Widget {
            enabled: false,
            channel_id: None,
        },
        SpaceSetting::SystemChannel(None),
    ];
    // community spaces reject moderation downgrades
    if !profile.has_feature(SpaceFeature::Community) {
        resets.push(SpaceSetting::ExplicitContentFilter(
            ExplicitContentFilter::Disabled,
        ));
        resets.push(SpaceSetting::VerificationLevel(VerificationLevel::None));
    }
    let applied = resets.into_iter().map(|setting| async move {
        let name = setting.op_name();
        (name.to_string(), host.apply_setting(space_id, setting).await)
    });
    log_failures("setting", join_all(applied).await);

    info!(space_id, "target space cleared");
    Ok(())
}

fn log_failures(kind: &str, outcomes: Vec<(String, Result<(), HostError>)>) {
    for (name, outcome) in outcomes {
        if let Err(err) = outcome {
            warn!(kind, name = %name, error = %err, "clear step failed, continuing");
        }
    }
}
