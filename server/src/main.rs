//! Model API server: settings from the environment, schema from a JSON file,
//! PostgreSQL when `DATABASE_URL` is set, in-memory otherwise.
//!
//! Run from repo root: `cargo run -p model-api-server`

use model_api::{app, load_from_path, resolve, AppState, EntityStore, MemoryStore, PgStore, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("model_api=info,model_api_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let config = load_from_path(&settings.schema_path).await?;
    let registry = resolve(&config)?;

    let store: Arc<dyn EntityStore> = match &settings.database_url {
        Some(url) => Arc::new(PgStore::connect(url, settings.max_connections).await?),
        None => Arc::new(MemoryStore::new()),
    };
    tracing::info!(
        store = store.kind(),
        entities = registry.len(),
        schema = %settings.schema_path.display(),
        "model registry loaded"
    );

    let bind_addr = settings.bind_addr;
    let state = AppState::new(registry, store, settings);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Model API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
