use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use crate::bot::error::Error;
use crate::services::enforcement::Enforcer;
use crate::services::whitelist::guard::WhitelistGuard;

/// Start the background task that keeps the administrator cache fresh.
/// The first refresh runs immediately.
pub fn spawn_admin_refresher(
    enforcer: Arc<dyn Enforcer>,
    guard: Arc<WhitelistGuard>,
    chat_id: u64,
    every: Duration,
) {
    tokio::spawn(async move {
        let mut ticker = interval(every);

        loop {
            ticker.tick().await;

            if let Err(e) = refresh_admins(enforcer.as_ref(), &guard, chat_id).await {
                error!("Failed to refresh administrator list: {:?}", e);
            }
        }
    });
}

/// Replace the cached administrator set. On failure the previous set is kept.
pub async fn refresh_admins(
    enforcer: &dyn Enforcer,
    guard: &WhitelistGuard,
    chat_id: u64,
) -> Result<usize, Error> {
    let admins = enforcer.list_administrators(chat_id).await?;
    let count = admins.len();
    guard.replace_admins(admins);

    info!("Updated admin list: {} admins", count);
    Ok(count)
}
