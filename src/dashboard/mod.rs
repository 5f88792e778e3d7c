//! Dashboard: Axum web server hosting the panel.
//!
//! Serves a JSON API for every session command and a self-contained HTML
//! page that drives it. CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// The embedded dashboard HTML (compiled into the binary).
const DASHBOARD_HTML: &str = include_str!("templates/index.html");

/// Bind `port` and serve the dashboard until `shutdown` resolves.
pub async fn serve_dashboard(
    state: AppState,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server starting on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server error")?;

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Reads
        .route("/api/session", get(routes::get_session))
        .route("/api/analysis", get(routes::get_analysis))
        .route("/api/history", get(routes::get_history))
        .route("/api/balance-history", get(routes::get_balance_history))
        .route("/health", get(routes::health))
        // Commands
        .route("/api/configure", post(routes::post_configure))
        .route("/api/outcome", post(routes::post_outcome))
        .route("/api/settle", post(routes::post_settle))
        .route("/api/period/next", post(routes::post_next_period))
        .route("/api/history/clear", post(routes::post_clear_history))
        .route("/api/reset", post(routes::post_reset))
        // Dashboard HTML
        .route("/", get(index))
        .layer(cors)
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
