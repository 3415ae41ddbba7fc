pub mod reset_user;
pub mod stats;
pub mod whitelist;
