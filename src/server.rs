//! HTTP interface over the inference service.
//!
//! | Route | Method | Answer |
//! | --- | --- | --- |
//! | `/` | GET | service name, version and endpoints |
//! | `/health` | GET | 200 when the artifact is loaded, 503 otherwise |
//! | `/predict_batch` | POST | per-comment results plus batch statistics |

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::error::{Result, SentiscopeError};
use crate::service::SentimentService;

pub mod dto;
pub mod error;
pub mod handlers;

pub use error::ApiError;

/// All routes, with a permissive CORS layer for browser clients.
pub fn router(service: Arc<SentimentService>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict_batch", post(handlers::predict_batch))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(service: Arc<SentimentService>, config: &ServerConfig) -> Result<()> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!(
        "Listening on http://{} (model ready: {})",
        listener.local_addr()?,
        service.is_ready()
    );

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SentiscopeError::other(format!("server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
