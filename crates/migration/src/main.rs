use config::{Config, Environment, File};
use sea_orm_migration::prelude::*;
use std::env;

/// Resolve `database_url` the way the API server does: `config.yaml` first,
/// then environment overrides.
fn server_database_url() -> Option<String> {
    Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()
        .and_then(|settings| settings.get_string("database_url"))
        .ok()
}

#[tokio::main]
async fn main() {
    // The sea-orm CLI reads DATABASE_URL; `-u` still takes precedence.
    if env::var("DATABASE_URL").is_err() {
        if let Some(url) = server_database_url() {
            env::set_var("DATABASE_URL", url);
        }
    }
    cli::run_cli(migration::Migrator).await;
}
