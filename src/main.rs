use dotenvy::dotenv;
use storefront_core::{
    api::{self, AppState},
    config::{catalog, database, settings::Settings},
    errors::Result,
};
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

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    let settings = Settings::from_env();
    info!("Starting storefront with config file {}", settings.config_path);

    // 3. Connect and make sure every table exists
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 4. Seed the catalog on first start
    let seed = catalog::load_optional_config(&settings.config_path)?;
    catalog::seed_catalog(&db, &seed)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 5. Serve
    let app = api::router(AppState::new(db, settings.public_url.clone()));
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!("Storefront listening on {}", settings.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Storefront stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
