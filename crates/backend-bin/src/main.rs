use backend_lib::{config::Settings, routes, storage::FlatFileStore, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    // Try to load with explicit path if default doesn't work
    let settings = Settings::load()
        .or_else(|_| Settings::load_from("config/default.toml"))
        .unwrap_or_default();

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    // Create storage
    let store = FlatFileStore::new(&settings.data_dir)?;

    let bind_addr = settings.bind_addr;

    // Create application state and router
    let state = Arc::new(AppState::new(store, settings));
    let app = routes::create_router(state);

    // Start the server
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
