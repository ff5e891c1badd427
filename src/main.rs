use ambassador::{
    bot,
    config::{
        self, AppConfig,
        database::{self as database_config, DEFAULT_DATABASE_URL},
    },
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = Arc::new(
        AppConfig::from_env().inspect_err(|e| error!("Failed to load configuration: {}", e))?,
    );

    // 4. Connect to the database and create missing tables
    if app_config.database_url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = database_config::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database_config::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the species catalog
    let catalog = config::transformations::load_catalog(&app_config.transformations_path)
        .inspect_err(|e| error!("Failed to load transformation catalog: {}", e))?;
    config::transformations::seed_catalog(&db, &catalog)
        .await
        .inspect_err(|e| error!("Failed to seed transformation catalog: {}", e))?;

    // 6. Run the bot; the token is read right before use and never stored in AppConfig
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, app_config, db).await
}
