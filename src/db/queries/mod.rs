pub mod judgment;
pub mod punishment;
pub mod scoring_failure;
pub mod usage;
pub mod violation;
pub mod whitelist;
