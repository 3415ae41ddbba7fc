use poise::serenity_prelude::CreateAttachment;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds::{self, BULLET, DIVIDER};
use crate::constants::messages::QUOTA_EXHAUSTED_NOTE;
use crate::constants::moderation::STATS_WINDOW_DAYS;
use crate::services::stats::{chart_generator, get_moderation_stats};
use crate::utils::formatting::format_number;

/// View spam moderation statistics
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    // Defer since this might take a moment
    ctx.defer_ephemeral().await?;

    let data = ctx.data();
    let stats = get_moderation_stats(
        data.store.as_ref(),
        &data.limiter,
        &data.guard,
        data.clock.as_ref(),
        STATS_WINDOW_DAYS,
        data.settings.reset_window(),
        data.settings.dry_run,
    )
    .await?;

    let description = format!(
        "{}\n\n\
        **API Usage Today**\n\
        {} Calls: **{}**/{} ({} remaining)\n\n\
        **Last {} Days**\n\
        {} Messages judged: **{}**\n\
        {} Spam detected: **{}** ({:.1}%)\n\
        {} Warned: **{}** | Kicked: **{}** | Banned: **{}**\n\n\
        {}\n\n\
        {} Users with active violations: **{}**\n\
        {} Whitelisted: **{}** | Cached admins: **{}**",
        DIVIDER,
        BULLET, format_number(stats.usage.calls_made as i64), format_number(stats.usage.daily_limit as i64),
        format_number(stats.usage.remaining() as i64),
        stats.window_days,
        BULLET, format_number(stats.judged),
        BULLET, format_number(stats.spam), stats.spam_rate(),
        BULLET, stats.warned, stats.kicked, stats.banned,
        DIVIDER,
        BULLET, stats.active_violators,
        BULLET, stats.whitelisted, stats.administrators
    );

    let quota_exhausted = stats.usage.is_exhausted();
    let description = if quota_exhausted {
        format!("{}\n\n{}", QUOTA_EXHAUSTED_NOTE, description)
    } else {
        description
    };

    let title = if stats.dry_run {
        "Spam Moderation Stats (dry run)"
    } else {
        "Spam Moderation Stats"
    };
    let mut embed = embeds::report_embed(stats.dry_run, quota_exhausted)
        .title(title)
        .description(description);

    let mut reply = poise::CreateReply::default();

    match chart_generator::generate_moderation_chart(&stats) {
        Ok(chart_data) => {
            embed = embed.image("attachment://stats.png");
            reply = reply.attachment(CreateAttachment::bytes(chart_data, "stats.png"));
        }
        Err(e) => {
            tracing::warn!("Failed to generate chart: {:?}", e);
        }
    }

    reply = reply.embed(embed).ephemeral(true);
    ctx.send(reply).await?;

    Ok(())
}
