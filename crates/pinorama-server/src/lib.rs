//! HTTP server for pinorama
//!
//! Exposes a [`pinorama_index::LogIndex`] over JSON routes: bulk ingestion,
//! search, introspection, generated styles, clearing, and snapshot
//! persistence. The snapshot is restored on startup and written on shutdown
//! when a database path is configured.

mod auth;
mod config;
mod error;
mod routes;
mod state;
mod styles;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ServerConfig, DEFAULT_BODY_LIMIT, DEFAULT_HOST, DEFAULT_PORT};
pub use error::ServerError;
pub use state::ServerState;
pub use styles::stylesheet;

/// Build the application router for `state`
pub fn router(state: Arc<ServerState>, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/bulk", post(routes::bulk))
        .route("/search", post(routes::search))
        .route("/introspection", get(routes::introspection))
        .route("/styles.css", get(routes::styles))
        .route("/clear", post(routes::clear))
        .route("/persist", post(routes::persist))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_secret,
        ))
        .route("/health", get(routes::health))
        .with_state(state);

    let app = match config.mount_path() {
        Some(path) => Router::new().nest(&path, api),
        None => api,
    };

    app.fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the server until `shutdown` is cancelled
///
/// Restores the snapshot before accepting requests and writes it after the
/// last connection has drained.
pub async fn serve(config: ServerConfig, shutdown: CancellationToken) -> Result<(), ServerError> {
    let state = Arc::new(ServerState::from_config(&config)?);

    let restored = state.restore().await?;
    if restored > 0 {
        tracing::info!(documents = restored, "Restored records from snapshot");
    }

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let bound = listener.local_addr()?;
    tracing::info!(url = %config.public_url(bound), "Pinorama server listening");

    let app = router(state.clone(), &config);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    if state.db_path.is_some() {
        state.persist().await?;
    }
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
