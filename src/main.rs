//! Diabetes Prediction API Server
//!
//! Serves a pre-trained diabetes risk classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  DIABETES PREDICTION API                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────────────────────────────────┐ │
//! │  │  API      │  │  Preprocessing Pipeline                 │ │
//! │  │  (Axum)   │─▶│  encode → reorder → scale → select      │ │
//! │  └───────────┘  └────────────────────┬────────────────────┘ │
//! │                                      ▼                      │
//! │                            ┌──────────────────┐             │
//! │                            │   Classifier     │             │
//! │                            └────────┬─────────┘             │
//! │                                     │ loaded once           │
//! │                            ┌────────┴─────────┐             │
//! │                            │  models/*.json   │             │
//! │                            └──────────────────┘             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod middleware;
mod model;
mod models;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{HeaderValue, Uri},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    init_tracing(&config);
    log_banner(&config);

    // Load model artifacts
    let models_dir = config.models_dir();
    let model = model::ModelService::load(&models_dir, config.model_required)
        .with_context(|| format!("Failed to load model artifacts from {}", models_dir.display()))?;

    // Build application state
    let state = AppState {
        model: Arc::new(model),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<model::ModelService>,
    pub config: config::Config,
}

fn init_tracing(config: &config::Config) {
    let mut rejected = None;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(log_directive(&config.log_level)).unwrap_or_else(|e| {
            rejected = Some(e);
            EnvFilter::new(log_directive("info"))
        })
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Some(e) = rejected {
        tracing::warn!("Invalid LOG_LEVEL '{}' ({}); using info", config.log_level, e);
    }
}

fn log_directive(level: &str) -> String {
    format!("diabetes_api={0},tower_http={0}", level)
}

fn log_banner(config: &config::Config) {
    let url = config.public_url();

    tracing::info!("Diabetes Prediction API v{} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Host: {}  Port: {}", config.host, config.port);
    tracing::info!("Auto-reload: {}", config.reload_enabled());
    tracing::info!("Log level: {}", config.log_level);
    tracing::info!("Models directory: {}", config.models_dir().display());
    tracing::info!("API will be accessible at: {}", url);
    tracing::info!("API Documentation: {}/docs", url);
    tracing::info!("Health check: {}/health", url);

    if config.public_ip.is_none() && config.host == "0.0.0.0" {
        tracing::info!("Set PUBLIC_IP to show the externally reachable address");
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/docs", get(handlers::docs::docs))
        .route("/model/info", get(handlers::health::model_info))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::predict_batch))
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &config::Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentials cannot be combined with wildcards, so mirror the request instead
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Not found: {}", uri.path()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
