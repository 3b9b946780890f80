#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use skincheck::{
    config::{database, settings},
    core::allergen,
    errors::Result,
    web,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load application settings
    let app_settings = settings::load_app_settings()
        .inspect_err(|e| error!("Critical error loading application settings: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the allergen catalog
    if app_settings.catalog.seed_on_startup {
        allergen::seed_catalog(&db, &app_settings.catalog.disabled_keys)
            .await
            .inspect(|inserted| info!("Allergen catalog seeded ({} new entries).", inserted))
            .inspect_err(|e| error!("Failed to seed allergen catalog: {}", e))?;
    }

    // 6. Serve until shutdown
    web::serve(&app_settings.server, db).await
}
