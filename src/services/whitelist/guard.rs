use std::collections::HashSet;

use dashmap::DashSet;
use parking_lot::RwLock;

/// Decides whether a user is exempt from moderation.
///
/// Exempt users are the configured whitelist plus the cached administrators
/// of the moderated guild. The administrator set is replaced wholesale by the
/// refresher task; a stale set can exempt (or fail to exempt) a user until the
/// next refresh.
#[derive(Debug, Default)]
pub struct WhitelistGuard {
    whitelist: DashSet<u64>,
    admins: RwLock<HashSet<u64>>,
}

impl WhitelistGuard {
    pub fn new(initial: impl IntoIterator<Item = u64>) -> Self {
        Self {
            whitelist: initial.into_iter().collect(),
            admins: RwLock::new(HashSet::new()),
        }
    }

    pub fn is_exempt(&self, user_id: u64) -> bool {
        self.whitelist.contains(&user_id) || self.is_admin(user_id)
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admins.read().contains(&user_id)
    }

    /// Returns false if the user was already whitelisted
    pub fn insert(&self, user_id: u64) -> bool {
        self.whitelist.insert(user_id)
    }

    /// Returns false if the user was not whitelisted
    pub fn remove(&self, user_id: u64) -> bool {
        self.whitelist.remove(&user_id).is_some()
    }

    /// Whitelisted users, sorted (administrators not included)
    pub fn whitelisted(&self) -> Vec<u64> {
        let mut users: Vec<u64> = self.whitelist.iter().map(|u| *u).collect();
        users.sort_unstable();
        users
    }

    pub fn whitelist_len(&self) -> usize {
        self.whitelist.len()
    }

    pub fn replace_admins(&self, admins: HashSet<u64>) {
        *self.admins.write() = admins;
    }

    pub fn admin_count(&self) -> usize {
        self.admins.read().len()
    }
}
