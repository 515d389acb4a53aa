pub mod aggregate;
pub mod dto;
mod handlers;
pub mod normalize;
pub mod services;
pub mod types;

use crate::state::AppState;
use axum::{routing::post, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/evaluate/barcode", post(handlers::evaluate_barcode))
        .route("/evaluate/describe", post(handlers::evaluate_describe))
        .route("/evaluate/confirm", post(handlers::confirm))
}
