use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId, Http};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands;
use crate::config::Settings;
use crate::db::{ModerationStore, PgStore};
use crate::handlers::event_handler::event_handler;
use crate::services::enforcement::{DiscordEnforcer, Enforcer};
use crate::services::moderation::{ModerationPipeline, ModerationPolicy};
use crate::services::quota::RateLimiter;
use crate::services::scorer::{OpenAiScorer, SpamScorer};
use crate::services::whitelist::{admin_refresher, manager, WhitelistGuard};
use crate::utils::clock::{Clock, SystemClock};

/// Wire the moderation services together
async fn build_data(settings: Settings, pool: PgPool) -> Result<Data, Error> {
    let store: Arc<dyn ModerationStore> = Arc::new(PgStore::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let guard = Arc::new(WhitelistGuard::default());
    manager::initialize(store.as_ref(), &guard, &settings.whitelist).await?;

    let http = Arc::new(Http::new(&settings.discord_token));
    let enforcer: Arc<dyn Enforcer> = Arc::new(DiscordEnforcer::new(http));

    let limiter = Arc::new(RateLimiter::new(
        store.clone(),
        clock.clone(),
        settings.daily_api_limit,
    ));

    let scorer: Arc<dyn SpamScorer> = Arc::new(OpenAiScorer::new(
        settings.openai_api_key.clone(),
        settings.openai_model.clone(),
        &settings.openai_base_url,
        settings.scorer_timeout(),
    ));

    let pipeline = ModerationPipeline::new(
        store.clone(),
        guard.clone(),
        limiter.clone(),
        scorer,
        enforcer.clone(),
        clock.clone(),
        ModerationPolicy::from_settings(&settings),
    );

    Ok(Data {
        settings,
        store,
        guard,
        limiter,
        enforcer,
        clock,
        pipeline,
    })
}

pub async fn run(settings: Settings, pool: PgPool) -> Result<(), Error> {
    let data = Arc::new(build_data(settings.clone(), pool).await?);

    if settings.dry_run {
        warn!("[DRY RUN] Dry run mode enabled: punishments are logged but not enforced");
    }

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::whitelist::whitelist(),
                commands::reset_user::reset_user(),
                commands::stats::stats(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None, // Slash commands only
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx.say(format!("Error: {}", error)).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
                            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
                        }
                        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
                            let _ = ctx.say("You need the Administrator permission to use this command.").await;
                        }
                        poise::FrameworkError::UnknownCommand { .. } => {}
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                // Records past their reset window are dead weight
                match data.pipeline.compact_expired_violations().await {
                    Ok(removed) => {
                        if removed > 0 {
                            info!("Startup cleanup: removed {} expired violation records", removed);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to compact expired violations: {:?}", e);
                    }
                }

                admin_refresher::spawn_admin_refresher(
                    data.enforcer.clone(),
                    data.guard.clone(),
                    data.settings.target_guild_id,
                    data.settings.admin_refresh_interval(),
                );
                info!("Started administrator refresher");

                let guild_id = GuildId::new(data.settings.target_guild_id);
                match poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id).await {
                    Ok(_) => {
                        info!(
                            "Registered {} commands in guild {}",
                            framework.options().commands.len(),
                            guild_id
                        );
                    }
                    Err(e) => {
                        error!("[FAIL] Failed to register guild commands: {:?}", e);
                        error!("Re-invite URL: https://discord.com/api/oauth2/authorize?client_id={}&permissions=0&scope=bot%20applications.commands", ready.user.id);
                        return Err(Error::Serenity(e));
                    }
                }

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}
