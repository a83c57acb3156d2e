//! HTTP server setup and route handlers
//!
//! Axum router for the registry API, build metadata and static assets.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    handler::HandlerWithoutStateExt,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use npmx_build_env::{AppEnv, BuildInfo};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::{files, AppError, AppState};

/// Build the application router.
///
/// Unknown paths fall through to the static asset directories in priority
/// order; the first directory containing the file wins. Paths no directory
/// can serve get a JSON `404`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/build-info", get(build_info_handler))
        .route("/api/registry/files", get(files::package_files_index))
        .route("/api/registry/files/", get(files::package_files_index))
        .route("/api/registry/files/{*pkg}", get(files::package_files));

    let router = with_public_assets(router, &state.app_env.public_assets);

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn with_public_assets(router: Router<Arc<AppState>>, dirs: &[PathBuf]) -> Router<Arc<AppState>> {
    let not_found = not_found_handler.into_service();
    match dirs {
        [] => router.fallback(not_found_handler),
        [only] => router.fallback_service(ServeDir::new(only).fallback(not_found)),
        [first, second, ..] => router.fallback_service(
            ServeDir::new(first).fallback(ServeDir::new(second).fallback(not_found)),
        ),
    }
}

async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route or asset for {}", uri.path()))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Public build metadata, never cached by clients.
async fn build_info_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    let build_info: &BuildInfo = &state.app_env.build_info;
    (StatusCode::OK, headers, Json(build_info.clone()))
}

pub async fn run_server(state: AppState) -> Result<()> {
    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    log_startup(&state.app_env);

    let addr: SocketAddr = format!("{}:{}", host, port).parse().map_err(|e| {
        error!(host = %host, port = %port, error = %e, "Invalid socket address");
        anyhow::anyhow!("Invalid socket address {}:{}: {}", host, port, e)
    })?;

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(addr = %addr, error = %e, "Failed to bind to address");
        anyhow::anyhow!("Failed to bind to {}:{}: {}", host, port, e)
    })?;

    let app = build_router(Arc::new(state));

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server error");
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

fn log_startup(app_env: &AppEnv) {
    let build = &app_env.build_info;
    info!(
        version = %build.version,
        env = %build.env,
        commit = %build.short_commit,
        branch = %build.branch,
        "Starting npmx server"
    );
    for dir in &app_env.public_assets {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "Public asset directory does not exist");
        }
    }
}
