//! Prediction handlers

use axum::{extract::State, Json};

use crate::middleware::ValidatedJson;
use crate::models::{BatchPredictionRequest, BatchPredictionResponse, PatientRecord, PredictionResponse};
use crate::{AppResult, AppState};

/// Predict diabetes risk for a single patient
pub async fn predict(
    State(state): State<AppState>,
    ValidatedJson(patient): ValidatedJson<PatientRecord>,
) -> AppResult<Json<PredictionResponse>> {
    let prediction = state.model.predict(&patient)?;

    tracing::debug!(
        "Prediction: label={} probability={:.4} risk={}",
        prediction.label,
        prediction.probability,
        prediction.risk_level()
    );

    Ok(Json(prediction.into()))
}

/// Predict diabetes risk for several patients, in request order
pub async fn predict_batch(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BatchPredictionRequest>,
) -> AppResult<Json<BatchPredictionResponse>> {
    let predictions = state.model.predict_batch(&req.patients)?;

    tracing::info!("Batch prediction completed for {} patients", predictions.len());

    Ok(Json(BatchPredictionResponse {
        predictions: predictions.into_iter().map(PredictionResponse::from).collect(),
    }))
}
