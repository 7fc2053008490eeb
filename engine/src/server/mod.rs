//! HTTP server
//!
//! Serves the built pages as static files and the stored result documents.
//!
//! # Endpoints
//!
//! - GET /api/results/:id - Result document as JSON, 404 when unknown
//! - GET /api/status - Server status
//! - anything else - static files from the pages output directory

use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::recommender::ResultStore;

/// Server state shared across handlers
#[derive(Clone)]
struct ServerState {
    store: ResultStore,
}

/// Build the router
pub fn router(store: ResultStore, static_dir: &Path) -> Router {
    let state = ServerState { store };

    Router::new()
        .route("/api/results/:id", get(result_handler))
        .route("/api/status", get(status_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(bind: &str, app: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Server shutting down gracefully");
        })
        .await?;
    Ok(())
}

async fn result_handler(State(state): State<ServerState>, UrlPath(id): UrlPath<String>) -> Response {
    match state.store.get(&id) {
        Some(document) => Json(document).into_response(),
        None => {
            warn!("Result {} requested but not found", id);
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Result not found"})),
            )
                .into_response()
        }
    }
}

async fn status_handler() -> impl IntoResponse {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
