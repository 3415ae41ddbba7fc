use poise::serenity_prelude::User;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::utils::formatting::mention_user;

/// Clear a user's violation count so their next offense is a first warning
#[poise::command(
    slash_command,
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn reset_user(
    ctx: Context<'_>,
    #[description = "User whose violations should be forgiven"] user: User,
) -> Result<(), Error> {
    let reset = ctx.data().pipeline.reset_user(user.id.get()).await?;

    let embed = if reset {
        embeds::success_embed()
            .title("Violations Reset")
            .description(format!(
                "{}'s violation count is back to 0. Their lifetime total is kept for the audit log.",
                mention_user(user.id.get())
            ))
    } else {
        embeds::info_embed()
            .title("Nothing To Reset")
            .description(format!("{} has no active violations.", mention_user(user.id.get())))
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
