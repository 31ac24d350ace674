use muista_api::AppResources;
use muista_api::api::start_webserver;
use muista_api::cache::RedisProbe;
use muista_api::config::load_config_or_panic;
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let default_directives = "muista_api=info,tower_http=info,sea_orm=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    // A missing .env is fine; real deployments configure through the environment.
    let _ = dotenvy::dotenv();

    initialize_standard_tracing();

    let config = Arc::new(load_config_or_panic());

    let db = Arc::new(Database::connect(&config.database_url).await?);
    tracing::info!("Connected to database");

    let cache = Arc::new(RedisProbe::connect(&config.redis_url).await?);

    let resources = AppResources::new(db, cache, config);
    tracing::info!(
        access_token_lifetime = resources.tokens.lifetime_secs(),
        listen_addr = %resources.config.listen_addr,
        "Starting muista-api"
    );

    start_webserver(resources).await?;
    Ok(())
}
