//! # TickList API Server
//!
//! REST backend for the TickList to-do application.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Account endpoints (signup, login, me) with JWT bearer auth
//! - Per-user task CRUD scoped to the token's owner
//! - Bulk operations (clear completed, transactional reorder)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p ticklist-api
//! ```

use ticklist_api::{
    app::{build_router, AppState},
    config::Config,
};
use ticklist_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticklist_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TickList API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db_config = pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    };
    let db = pool::create_pool(db_config).await?;

    migrations::run_migrations(&db).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
