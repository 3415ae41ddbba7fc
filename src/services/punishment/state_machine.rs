use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::constants::moderation::BAN_TIER;
use crate::db::models::ViolationRecord;

/// A user's standing within the current violation epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Clean,
    Warned,
    Kicked,
    Banned,
}

impl Tier {
    pub fn from_count(count: i32) -> Self {
        match count {
            c if c >= BAN_TIER => Tier::Banned,
            2 => Tier::Kicked,
            1 => Tier::Warned,
            _ => Tier::Clean,
        }
    }
}

/// What happens to the user on a new violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunishmentAction {
    /// Delete the message and warn the user privately
    Warn,
    /// Remove the user from the guild; they may rejoin
    Kick,
    /// Permanently ban the user
    Ban,
}

impl PunishmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunishmentAction::Warn => "warning",
            PunishmentAction::Kick => "kick",
            PunishmentAction::Ban => "ban",
        }
    }
}

impl fmt::Display for PunishmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of applying one spam verdict to a user's record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Count as stored before this violation
    pub stored_count: i32,
    /// Whether the reset window had lapsed, collapsing the user to Clean first
    pub reset_applied: bool,
    pub new_count: i32,
    pub tier: Tier,
    pub action: PunishmentAction,
}

/// Apply a spam verdict to a user's record.
///
/// Pure function of the prior count and whether the reset window lapsed.
/// The count grows by exactly one per violation; from the ban tier on it
/// keeps counting but the action stays a ban.
pub fn apply_violation(
    prior: Option<&ViolationRecord>,
    now: DateTime<Utc>,
    reset_after: Duration,
) -> Transition {
    let stored_count = prior.map(|r| r.violation_count.max(0)).unwrap_or(0);
    let reset_applied = prior.map(|r| r.is_expired(now, reset_after)).unwrap_or(false);
    let base = if reset_applied { 0 } else { stored_count };

    let new_count = base.saturating_add(1);
    let tier = Tier::from_count(new_count);
    let action = match tier {
        Tier::Clean | Tier::Warned => PunishmentAction::Warn,
        Tier::Kicked => PunishmentAction::Kick,
        Tier::Banned => PunishmentAction::Ban,
    };

    Transition {
        stored_count,
        reset_applied,
        new_count,
        tier,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ActivityCounts;

    fn record(count: i32, last: DateTime<Utc>) -> ViolationRecord {
        ViolationRecord {
            user_id: 1,
            violation_count: count,
            total_violations: count,
            last_violation_at: last,
            created_at: last,
            updated_at: last,
        }
    }

    #[test]
    fn test_escalation_table() {
        let now = Utc::now();
        let window = Duration::days(30);

        let first = apply_violation(None, now, window);
        assert_eq!((first.new_count, first.action), (1, PunishmentAction::Warn));
        assert_eq!(first.tier, Tier::Warned);

        let expected = [
            (1, 2, PunishmentAction::Kick, Tier::Kicked),
            (2, 3, PunishmentAction::Ban, Tier::Banned),
            (3, 4, PunishmentAction::Ban, Tier::Banned),
            (7, 8, PunishmentAction::Ban, Tier::Banned),
        ];
        for (prior, next, action, tier) in expected {
            let rec = record(prior, now - Duration::days(1));
            let t = apply_violation(Some(&rec), now, window);
            assert_eq!(t.stored_count, prior);
            assert_eq!(t.new_count, next);
            assert_eq!(t.action, action);
            assert_eq!(t.tier, tier);
            assert!(!t.reset_applied);
        }
    }

    #[test]
    fn test_lapsed_window_is_first_offense() {
        let now = Utc::now();
        let window = Duration::days(30);

        for prior in [1, 2, 5] {
            let rec = record(prior, now - Duration::days(31));
            let t = apply_violation(Some(&rec), now, window);
            assert!(t.reset_applied);
            assert_eq!(t.new_count, 1);
            assert_eq!(t.action, PunishmentAction::Warn);
        }
    }

    #[test]
    fn test_manually_reset_record_starts_over() {
        let now = Utc::now();
        let rec = record(0, now - Duration::hours(1));
        let t = apply_violation(Some(&rec), now, Duration::days(30));
        assert_eq!((t.new_count, t.action), (1, PunishmentAction::Warn));
    }

    #[test]
    fn test_action_names_match_activity_counters() {
        let mut counts = ActivityCounts::default();
        counts.add_action(PunishmentAction::Warn.as_str(), 1);
        counts.add_action(PunishmentAction::Kick.as_str(), 2);
        counts.add_action(PunishmentAction::Ban.as_str(), 3);
        assert_eq!((counts.warned, counts.kicked, counts.banned), (1, 2, 3));
    }
}
