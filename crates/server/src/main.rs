use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use relief_engine::PipelineConfig;
use tower_http::cors::CorsLayer;

mod ai;
mod build;
mod routes;

/// Uploaded images larger than this are rejected before decoding.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[derive(Clone)]
pub struct AppState {
    pub ai_api_key: Option<String>,
    pub config: Arc<PipelineConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(ai_api_key: Option<String>, config: PipelineConfig) -> Self {
        Self {
            ai_api_key,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/build", post(routes::build_stl))
        .route("/api/inspect", post(routes::inspect))
        .route("/api/suggest", post(routes::suggest))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,relief_engine=info".into()),
        )
        .init();

    let config = match std::env::var("RELIEF_CONFIG") {
        Ok(path) => match PipelineConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load config {path}: {e}");
                return;
            }
        },
        Err(_) => PipelineConfig::default(),
    };

    let ai_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
    if ai_api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set, /api/suggest will return defaults");
    }

    let addr = std::env::var("RELIEF_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            return;
        }
    };

    tracing::info!("Server running on http://{addr}");
    if let Err(e) = axum::serve(listener, app(AppState::new(ai_api_key, config))).await {
        tracing::error!("Server error: {e}");
    }
}
