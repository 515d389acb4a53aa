mod dto;
mod handlers;
mod repo;

pub use repo::{IntakeLedger, IntakeRecord, IntakeSource, LedgerError, NewIntakeRecord, PgIntakeLedger};

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/intake/today", get(handlers::today_total))
}
