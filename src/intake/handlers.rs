use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, instrument};

use crate::nutrition::types::DailyIntakeTotal;
use crate::state::AppState;

use super::dto::TodayQuery;

#[instrument(skip(state))]
pub async fn today_total(
    State(state): State<AppState>,
    Query(q): Query<TodayQuery>,
) -> Result<Json<DailyIntakeTotal>, (StatusCode, String)> {
    match state.ledger.today_total(&q.email).await {
        Ok(total) => Ok(Json(total)),
        Err(e) => {
            error!(error = %e, email = %q.email, "today total read failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
