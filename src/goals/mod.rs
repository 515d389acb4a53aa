mod dto;
mod handlers;
mod repo;

pub use repo::{GoalContext, GoalStore, GoalStoreError, PgGoalStore};

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/fitness/goal", get(handlers::get_goal).post(handlers::set_goal))
}
