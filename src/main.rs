use anyhow::Context;
use inkblog::{
    AppState,
    config::{AppConfig, Env},
    create_router, db,
    repository::{RepositoryState, SqliteRepository},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database, then the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration (fails fast on a missing production secret)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate and request logs from tower_http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inkblog=debug,tower_http=info".into());

    // 3. Log format follows the environment: pretty locally, JSON in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database (SQLite, WAL) and schema
    let pool = db::init(&config.db_url)
        .await
        .with_context(|| format!("failed to open database at {}", config.db_url))?;
    let repo = Arc::new(SqliteRepository::new(pool)) as RepositoryState;

    // 5. Router and Server Startup
    let address = config.bind_address();
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("Listening on {address}");
    tracing::info!("OpenAPI document available at http://{address}/api-docs/openapi.json");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
