use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use time::format_description::FormatItem;
use time::macros::format_description;
use tracing::{error, instrument, warn};

use crate::state::AppState;

use super::dto::{GoalQuery, SetGoalRequest};
use super::repo::GoalContext;

const ALLOWED_GOALS: &[&str] = &["Lose", "Gain", "Maintain"];
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    Query(q): Query<GoalQuery>,
) -> Result<Json<GoalContext>, (StatusCode, String)> {
    match state.goals.fetch(&q.email).await {
        Ok(context) => Ok(Json(context)),
        Err(e) => {
            error!(error = %e, email = %q.email, "goal fetch failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn set_goal(
    State(state): State<AppState>,
    Json(payload): Json<SetGoalRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !ALLOWED_GOALS.contains(&payload.goal.as_str()) {
        warn!(goal = %payload.goal, "rejected unknown goal");
        return Err((
            StatusCode::BAD_REQUEST,
            "goal must be Lose, Gain or Maintain".into(),
        ));
    }
    if let Some(date) = payload.target_date.as_deref() {
        if time::Date::parse(date, DATE_FORMAT).is_err() {
            return Err((
                StatusCode::BAD_REQUEST,
                "target_date must be YYYY-MM-DD".into(),
            ));
        }
    }

    let context = GoalContext {
        goal: payload.goal,
        target_date: payload.target_date,
    };
    state.goals.upsert(&payload.email, &context).await.map_err(|e| {
        error!(error = %e, email = %payload.email, "goal upsert failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(StatusCode::NO_CONTENT)
}
