pub mod aggregator;
pub mod chart_generator;

pub use aggregator::{get_moderation_stats, ModerationStats};
