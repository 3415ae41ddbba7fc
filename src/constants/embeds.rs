use serenity::all::{Colour, CreateEmbed};

/// Normal moderation reports
pub const REPORT_COLOR: Colour = Colour::from_rgb(59, 130, 246);

/// A command changed moderation state
pub const APPLIED_COLOR: Colour = Colour::from_rgb(16, 185, 129);

/// Nothing changed, or moderation is degraded
pub const DEGRADED_COLOR: Colour = Colour::from_rgb(245, 158, 11);

pub const NEUTRAL_COLOR: Colour = Colour::from_rgb(100, 116, 139);

/// Punishments are computed but not enforced
pub const DRY_RUN_COLOR: Colour = Colour::from_rgb(139, 92, 246);

pub const DIVIDER: &str = "───────────────────────";

pub const BULLET: &str = "•";

pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(APPLIED_COLOR)
}

pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(DEGRADED_COLOR)
}

pub fn info_embed() -> CreateEmbed {
    CreateEmbed::new().color(NEUTRAL_COLOR)
}

/// Color for the /stats report. An exhausted quota wins over dry run since
/// messages are passing unscored.
pub fn report_color(dry_run: bool, quota_exhausted: bool) -> Colour {
    if quota_exhausted {
        DEGRADED_COLOR
    } else if dry_run {
        DRY_RUN_COLOR
    } else {
        REPORT_COLOR
    }
}

pub fn report_embed(dry_run: bool, quota_exhausted: bool) -> CreateEmbed {
    CreateEmbed::new().color(report_color(dry_run, quota_exhausted))
}

pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("{} {}", BULLET, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
