use poise::serenity_prelude::User;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::whitelist::manager;
use crate::utils::formatting::mention_user;

/// Manage users exempt from spam moderation
#[poise::command(
    slash_command,
    subcommands("list", "add", "remove"),
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn whitelist(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("Use one of the subcommands: `/whitelist list`, `/whitelist add`, `/whitelist remove`")
        .await?;
    Ok(())
}

/// Show whitelisted users
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let users = ctx.data().guard.whitelisted();

    let description = if users.is_empty() {
        "No users are whitelisted.".to_string()
    } else {
        let mentions: Vec<String> = users.iter().map(|u| mention_user(*u)).collect();
        embeds::bullet_list(&mentions)
    };

    let embed = embeds::info_embed()
        .title(format!("Whitelisted Users ({})", users.len()))
        .description(description)
        .footer(poise::serenity_prelude::CreateEmbedFooter::new(format!(
            "Server administrators are always exempt ({} cached)",
            ctx.data().guard.admin_count()
        )));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Exempt a user from spam moderation
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "User to whitelist"] user: User,
) -> Result<(), Error> {
    let data = ctx.data();
    let added = manager::add(data.store.as_ref(), &data.guard, user.id.get()).await?;

    let embed = if added {
        embeds::success_embed()
            .title("User Whitelisted")
            .description(format!("{} will no longer be checked for spam.", mention_user(user.id.get())))
    } else {
        embeds::warning_embed()
            .title("Already Whitelisted")
            .description(format!("{} is already on the whitelist.", mention_user(user.id.get())))
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Remove a user from the whitelist
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "User to remove from the whitelist"] user: User,
) -> Result<(), Error> {
    let data = ctx.data();
    let removed = manager::remove(data.store.as_ref(), &data.guard, user.id.get()).await?;

    let embed = if removed {
        embeds::success_embed()
            .title("User Removed")
            .description(format!("{} is no longer whitelisted.", mention_user(user.id.get())))
    } else {
        embeds::warning_embed()
            .title("Not Whitelisted")
            .description(format!("{} was not on the whitelist.", mention_user(user.id.get())))
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
