pub mod admin_refresher;
pub mod guard;
pub mod manager;

pub use guard::WhitelistGuard;
