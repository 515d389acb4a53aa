use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, instrument};

use crate::state::AppState;

use super::dto::{BarcodeRequest, ConfirmRequest, ConfirmResponse, DescribeRequest, EvaluationResponse};
use super::services::{self, EvaluateError};

#[instrument(skip(state, payload))]
pub async fn evaluate_barcode(
    State(state): State<AppState>,
    Json(payload): Json<BarcodeRequest>,
) -> Result<Json<EvaluationResponse>, (StatusCode, String)> {
    if payload.barcode.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "barcode must be non-empty".into()));
    }
    services::evaluate_barcode(&state, &payload.email, payload.barcode.trim())
        .await
        .map(Json)
        .map_err(evaluate_status)
}

#[instrument(skip(state, payload))]
pub async fn evaluate_describe(
    State(state): State<AppState>,
    Json(payload): Json<DescribeRequest>,
) -> Result<Json<EvaluationResponse>, (StatusCode, String)> {
    if payload.description.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "description must be non-empty".into()));
    }
    services::evaluate_described(&state, &payload.email, payload.description.trim())
        .await
        .map(Json)
        .map_err(evaluate_status)
}

#[instrument(skip(state, payload))]
pub async fn confirm(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<(StatusCode, Json<ConfirmResponse>), (StatusCode, String)> {
    match services::confirm(&state, payload).await {
        Ok(Some(record)) => Ok((
            StatusCode::CREATED,
            Json(ConfirmResponse {
                recorded: true,
                record: Some(record),
            }),
        )),
        Ok(None) => Ok((
            StatusCode::OK,
            Json(ConfirmResponse {
                recorded: false,
                record: None,
            }),
        )),
        Err(e) => {
            error!(error = %e, "intake append failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

fn evaluate_status(e: EvaluateError) -> (StatusCode, String) {
    match &e {
        EvaluateError::ProductNotFound => (StatusCode::NOT_FOUND, e.to_string()),
        EvaluateError::Lookup(_) | EvaluateError::Describe(_) => {
            error!(error = %e, "macro source failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
