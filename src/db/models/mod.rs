mod activity;
mod daily_usage;
mod punishment_record;
mod scoring_failure;
mod spam_judgment;
mod violation_record;

pub use activity::ActivityCounts;
pub use daily_usage::DailyUsage;
pub use punishment_record::PunishmentRecord;
pub use scoring_failure::ScoringFailure;
pub use spam_judgment::SpamJudgment;
pub use violation_record::ViolationRecord;
