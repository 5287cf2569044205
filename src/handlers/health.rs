//! Service banner, health check and model info handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::model::ModelInfo;
use crate::AppState;

pub const SERVICE_NAME: &str = "Diabetes Prediction API";

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    version: &'static str,
    docs: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    model_type: Option<&'static str>,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        docs: "/docs",
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.model.is_model_loaded(),
        model_type: state.model.model_type(),
    })
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.model.info())
}
