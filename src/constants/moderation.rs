/// Spam scoring defaults (can be overridden via env vars)
pub const DEFAULT_SPAM_THRESHOLD: f64 = 8.0;
pub const DEFAULT_DAILY_API_LIMIT: u32 = 1000;
pub const DEFAULT_VIOLATION_RESET_DAYS: u32 = 30;
pub const DEFAULT_SCORER_TIMEOUT_SECONDS: u64 = 15;

/// How often the administrator cache is refreshed from Discord
pub const DEFAULT_ADMIN_REFRESH_SECONDS: u64 = 10 * 60;

/// Scores live on a 0-10 scale
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Scoring oracle defaults
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const SCORER_TEMPERATURE: f32 = 0.3;
pub const SCORER_MAX_TOKENS: u32 = 200;

/// Rationale text kept per judgment
pub const MAX_RATIONALE_CHARS: usize = 200;

/// Violation count at which a user is permanently banned
pub const BAN_TIER: i32 = 3;

/// Rolling window used by /stats
pub const STATS_WINDOW_DAYS: i64 = 7;

/// Discord member listing page size
pub const MEMBER_PAGE_SIZE: u64 = 1000;

/// Message text kept in the judgment audit log
pub const MAX_LOGGED_TEXT_CHARS: usize = 1000;
