use tracing::{debug, info, warn};

use crate::bot::error::Error;
use crate::constants::messages::{BAN_NOTICE, KICK_NOTICE, WARNING_NOTICE};
use crate::services::enforcement::Enforcer;
use crate::services::punishment::state_machine::PunishmentAction;

/// The offending message and its author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnforcementTarget {
    pub chat_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    pub user_id: u64,
}

/// Carry out a punishment on the platform.
///
/// The offending message is deleted on every tier. Kicks and bans are
/// preceded by a best-effort private notice, sent first because the user can
/// no longer be reached once they share no guild with the bot. Every failed
/// call is collected into a single `EnforcementDispatchFailed`.
pub async fn dispatch(
    enforcer: &dyn Enforcer,
    target: &EnforcementTarget,
    action: PunishmentAction,
) -> Result<(), Error> {
    let mut failures = Vec::new();

    match enforcer.delete_message(target.channel_id, target.message_id).await {
        Ok(()) => info!("Deleted spam message from user {}", target.user_id),
        Err(e) => failures.push(format!("delete message: {}", e)),
    }

    match action {
        PunishmentAction::Warn => {
            if let Err(e) = enforcer.warn_user(target.user_id, WARNING_NOTICE).await {
                failures.push(format!("warn user: {}", e));
            }
        }
        PunishmentAction::Kick => {
            notify(enforcer, target.user_id, KICK_NOTICE).await;
            match enforcer.kick_user(target.chat_id, target.user_id).await {
                Ok(()) => info!("Kicked user {} from chat {}", target.user_id, target.chat_id),
                Err(e) => failures.push(format!("kick user: {}", e)),
            }
        }
        PunishmentAction::Ban => {
            notify(enforcer, target.user_id, BAN_NOTICE).await;
            match enforcer.ban_user(target.chat_id, target.user_id).await {
                Ok(()) => info!("Banned user {} from chat {}", target.user_id, target.chat_id),
                Err(e) => failures.push(format!("ban user: {}", e)),
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        warn!(
            "Enforcement of {} for user {} partially failed: {}",
            action,
            target.user_id,
            failures.join("; ")
        );
        Err(Error::dispatch_failed(action, failures.join("; ")))
    }
}

async fn notify(enforcer: &dyn Enforcer, user_id: u64, text: &str) {
    if let Err(e) = enforcer.warn_user(user_id, text).await {
        debug!("Could not DM user {}: {:?}", user_id, e);
    }
}
