use spamguard::{bot, config::Settings, db};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Refusing to start spamguard, configuration is invalid: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting spamguard: {}", settings.startup_summary());

    let pool = match db::pool::create_pool(&settings.database_url).await {
        Ok(p) => p,
        Err(e) => {
            error!("Moderation store unreachable: {}", e);
            std::process::exit(1);
        }
    };

    // Judgments, violations and quota all live in these tables
    if let Err(e) = db::pool::run_migrations(&pool).await {
        error!("Failed to migrate moderation tables: {}", e);
        std::process::exit(1);
    }

    info!("Moderation store ready");

    if let Err(e) = bot::framework::run(settings, pool).await {
        error!("Spamguard stopped: {}", e);
        std::process::exit(1);
    }
}
