//! API documentation handler

use axum::Json;
use serde::Serialize;

use crate::model::{Prediction, RiskLevel};
use crate::models::{PatientRecord, PredictionResponse};

use super::health::SERVICE_NAME;

#[derive(Serialize)]
pub struct EndpointDoc {
    method: &'static str,
    path: &'static str,
    summary: &'static str,
}

#[derive(Serialize)]
pub struct DocsResponse {
    title: &'static str,
    version: &'static str,
    description: &'static str,
    endpoints: Vec<EndpointDoc>,
    example_request: PatientRecord,
    example_response: PredictionResponse,
    risk_levels: Vec<(RiskLevel, &'static str)>,
}

const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/", "Service banner"),
    ("GET", "/health", "Health check and model status"),
    ("GET", "/docs", "This document"),
    ("GET", "/model/info", "Loaded model and preprocessing pipeline"),
    ("POST", "/predict", "Predict diabetes risk for a single patient"),
    ("POST", "/predict/batch", "Predict diabetes risk for multiple patients: {\"patients\": [...]}"),
];

pub async fn docs() -> Json<DocsResponse> {
    Json(DocsResponse {
        title: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: "API for predicting diabetes risk based on patient features",
        endpoints: ENDPOINTS
            .iter()
            .map(|&(method, path, summary)| EndpointDoc { method, path, summary })
            .collect(),
        example_request: PatientRecord::example(),
        example_response: Prediction { label: 0, probability: 0.15 }.into(),
        risk_levels: vec![
            (RiskLevel::Low, "probability < 0.30"),
            (RiskLevel::Medium, "0.30 <= probability < 0.70"),
            (RiskLevel::High, "probability >= 0.70"),
        ],
    })
}
