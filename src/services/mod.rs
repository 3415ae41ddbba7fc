pub mod enforcement;
pub mod moderation;
pub mod punishment;
pub mod quota;
pub mod scorer;
pub mod stats;
pub mod whitelist;
