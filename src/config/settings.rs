use std::env;
use std::time::Duration;

use crate::constants::moderation::{
    DEFAULT_ADMIN_REFRESH_SECONDS, DEFAULT_DAILY_API_LIMIT, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL, DEFAULT_SCORER_TIMEOUT_SECONDS, DEFAULT_SPAM_THRESHOLD,
    DEFAULT_VIOLATION_RESET_DAYS, MAX_SCORE, MIN_SCORE,
};

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    /// The single guild this instance moderates
    pub target_guild_id: u64,
    /// Score (0-10) at or above which a message is spam
    pub spam_threshold: f64,
    /// Scoring calls allowed per calendar day
    pub daily_api_limit: u32,
    /// Days without a violation before a user's history is forgiven
    pub violation_reset_days: u32,
    /// Seeds the persisted whitelist when it is empty
    pub whitelist: Vec<u64>,
    /// Compute and log punishments without enforcing them
    pub dry_run: bool,
    pub scorer_timeout_seconds: u64,
    pub admin_refresh_seconds: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the process env in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| format!("{} environment variable not set", key))
        };

        let discord_token = required("DISCORD_TOKEN")?;
        let database_url = required("DATABASE_URL")?;
        let openai_api_key = required("OPENAI_API_KEY")?;

        let target_guild_id = required("TARGET_GUILD_ID")?
            .trim()
            .parse::<u64>()
            .map_err(|_| "TARGET_GUILD_ID must be a numeric guild id".to_string())?;

        let openai_model = lookup("OPENAI_MODEL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        let openai_base_url = lookup("OPENAI_BASE_URL")
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let spam_threshold = parse_or(&lookup, "SPAM_THRESHOLD", DEFAULT_SPAM_THRESHOLD)?;
        if !spam_threshold.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&spam_threshold) {
            return Err(format!(
                "SPAM_THRESHOLD must be between {} and {}, got {}",
                MIN_SCORE, MAX_SCORE, spam_threshold
            ));
        }

        let daily_api_limit = parse_positive(&lookup, "DAILY_API_LIMIT", DEFAULT_DAILY_API_LIMIT)?;
        let violation_reset_days =
            parse_positive(&lookup, "VIOLATION_RESET_DAYS", DEFAULT_VIOLATION_RESET_DAYS)?;
        let scorer_timeout_seconds =
            parse_positive(&lookup, "SCORER_TIMEOUT_SECONDS", DEFAULT_SCORER_TIMEOUT_SECONDS)?;
        let admin_refresh_seconds =
            parse_positive(&lookup, "ADMIN_REFRESH_SECONDS", DEFAULT_ADMIN_REFRESH_SECONDS)?;

        let whitelist = match lookup("WHITELIST") {
            Some(raw) => parse_id_list(&raw)?,
            None => Vec::new(),
        };

        let dry_run = match lookup("DRY_RUN") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| format!("DRY_RUN is not a boolean: {}", raw))?,
            None => false,
        };

        Ok(Self {
            discord_token,
            database_url,
            openai_api_key,
            openai_model,
            openai_base_url,
            target_guild_id,
            spam_threshold,
            daily_api_limit,
            violation_reset_days,
            whitelist,
            dry_run,
            scorer_timeout_seconds,
            admin_refresh_seconds,
        })
    }

    pub fn reset_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.violation_reset_days as i64)
    }

    pub fn scorer_timeout(&self) -> Duration {
        Duration::from_secs(self.scorer_timeout_seconds)
    }

    pub fn admin_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.admin_refresh_seconds)
    }

    /// One-line moderation setup for the startup log. Never includes secrets.
    pub fn startup_summary(&self) -> String {
        let mut summary = format!(
            "guild {} | model {} | spam at score >= {} | {} scoring calls/day | history forgiven after {} days",
            self.target_guild_id,
            self.openai_model,
            self.spam_threshold,
            self.daily_api_limit,
            self.violation_reset_days
        );
        if !self.whitelist.is_empty() {
            summary.push_str(&format!(" | {} configured whitelist ids", self.whitelist.len()));
        }
        if self.dry_run {
            summary.push_str(" | dry run");
        }
        summary
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default + Copy,
{
    let value = parse_or(lookup, key, default)?;
    if value <= T::default() {
        return Err(format!("{} must be a positive integer", key));
    }
    Ok(value)
}

fn parse_id_list(raw: &str) -> Result<Vec<u64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| format!("WHITELIST contains an invalid user id: {}", s))
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DISCORD_TOKEN", "token"),
            ("DATABASE_URL", "postgres://localhost/spamguard"),
            ("OPENAI_API_KEY", "sk-test"),
            ("TARGET_GUILD_ID", "123456789"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Settings, String> {
        Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let settings = load(&base_env()).unwrap();
        assert_eq!(settings.target_guild_id, 123456789);
        assert_eq!(settings.spam_threshold, 8.0);
        assert_eq!(settings.daily_api_limit, 1000);
        assert_eq!(settings.violation_reset_days, 30);
        assert_eq!(settings.openai_model, "gpt-4o-mini");
        assert!(settings.whitelist.is_empty());
        assert!(!settings.dry_run);
        assert_eq!(settings.reset_window(), chrono::Duration::days(30));
    }

    #[test]
    fn test_overrides() {
        let mut env = base_env();
        env.insert("SPAM_THRESHOLD", "7.5");
        env.insert("DAILY_API_LIMIT", "50");
        env.insert("WHITELIST", "11, 22 ,33");
        env.insert("DRY_RUN", "yes");
        env.insert("OPENAI_BASE_URL", "http://localhost:8080/v1/");

        let settings = load(&env).unwrap();
        assert_eq!(settings.spam_threshold, 7.5);
        assert_eq!(settings.daily_api_limit, 50);
        assert_eq!(settings.whitelist, vec![11, 22, 33]);
        assert!(settings.dry_run);
        assert_eq!(settings.openai_base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_startup_summary() {
        let mut env = base_env();
        env.insert("WHITELIST", "11,22");
        env.insert("DRY_RUN", "true");
        let settings = load(&env).unwrap();

        let summary = settings.startup_summary();
        assert_eq!(
            summary,
            "guild 123456789 | model gpt-4o-mini | spam at score >= 8 | 1000 scoring calls/day \
             | history forgiven after 30 days | 2 configured whitelist ids | dry run"
        );
        assert!(!summary.contains("sk-test"));
        assert!(!summary.contains("token"));
    }

    #[test]
    fn test_missing_required() {
        let mut env = base_env();
        env.remove("OPENAI_API_KEY");
        assert!(load(&env).unwrap_err().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut env = base_env();
        env.insert("SPAM_THRESHOLD", "11");
        assert!(load(&env).is_err());

        let mut env = base_env();
        env.insert("DAILY_API_LIMIT", "0");
        assert!(load(&env).is_err());

        let mut env = base_env();
        env.insert("WHITELIST", "12,abc");
        assert!(load(&env).is_err());

        let mut env = base_env();
        env.insert("DRY_RUN", "maybe");
        assert!(load(&env).is_err());
    }
}
