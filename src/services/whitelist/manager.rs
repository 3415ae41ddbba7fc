use tracing::{debug, info};

use crate::bot::error::Error;
use crate::db::store::ModerationStore;
use crate::services::whitelist::guard::WhitelistGuard;

/// Load the persisted whitelist into the guard. The configured users only
/// seed an empty table; afterwards the commands own the list, so a
/// configured user removed at runtime stays removed across restarts.
pub async fn initialize(
    store: &dyn ModerationStore,
    guard: &WhitelistGuard,
    configured: &[u64],
) -> Result<usize, Error> {
    let mut persisted = store.whitelist().await?;

    if persisted.is_empty() && !configured.is_empty() {
        for user_id in configured {
            store.add_whitelist(*user_id as i64).await?;
        }
        persisted = store.whitelist().await?;
        info!("Seeded whitelist with {} configured users", persisted.len());
    } else if !configured.is_empty() {
        debug!("Whitelist already persisted, ignoring configured users");
    }

    for user_id in &persisted {
        guard.insert(*user_id as u64);
    }

    info!("Loaded {} whitelisted users", guard.whitelist_len());
    Ok(guard.whitelist_len())
}

/// Add a user to the whitelist. Returns false if they were already on it.
pub async fn add(
    store: &dyn ModerationStore,
    guard: &WhitelistGuard,
    user_id: u64,
) -> Result<bool, Error> {
    let added = store.add_whitelist(user_id as i64).await?;
    guard.insert(user_id);

    if added {
        info!("Added user {} to whitelist", user_id);
    }
    Ok(added)
}

/// Remove a user from the whitelist. Returns false if they were not on it.
pub async fn remove(
    store: &dyn ModerationStore,
    guard: &WhitelistGuard,
    user_id: u64,
) -> Result<bool, Error> {
    let removed = store.remove_whitelist(user_id as i64).await?;
    guard.remove(user_id);

    if removed {
        info!("Removed user {} from whitelist", user_id);
    }
    Ok(removed)
}
