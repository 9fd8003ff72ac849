// src/server/mod.rs
// =============================================================================
// The HTTP API behind `edu-importer serve`.
//
// Routes (all under /api):
//   GET    /health
//   GET    /github/branches?owner=&repo=
//   GET    /github/serve?owner=&repo=&branch=     live render, no storage
//   GET    /assignments                           newest first, filterable
//   POST   /assignments/import
//   GET    /assignments/:id
//   PATCH  /assignments/:id                       partial edit, (un)publish
//   DELETE /assignments/:id
//   GET    /assignments/:id/serve                 stored entry page
//
// Shuts down cleanly on Ctrl+C or SIGTERM.
// =============================================================================

mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::state::AppState;

use routes::{
    branches_handler, delete_assignment_handler, get_assignment_handler, health_handler,
    import_handler, list_assignments_handler, live_serve_handler, serve_assignment_handler,
    update_assignment_handler,
};

/// Origins of the front-end dev servers
const DEV_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
];

pub fn router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = DEV_ORIGINS
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/github/branches", get(branches_handler))
        .route("/api/github/serve", get(live_serve_handler))
        .route("/api/assignments", get(list_assignments_handler))
        .route("/api/assignments/import", post(import_handler))
        .route(
            "/api/assignments/:id",
            get(get_assignment_handler)
                .patch(update_assignment_handler)
                .delete(delete_assignment_handler),
        )
        .route("/api/assignments/:id/serve", get(serve_assignment_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(state: Arc<AppState>, config: ServerConfig) -> anyhow::Result<()> {
    state.storage.ensure_root().await?;

    let app = router(state);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
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
}
