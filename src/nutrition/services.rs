use thiserror::Error;
use tracing::warn;

use crate::goals::GoalContext;
use crate::intake::{IntakeRecord, IntakeSource, LedgerError, NewIntakeRecord};
use crate::lookup::LookupError;
use crate::oracle::{DecisionRequest, DecisionResult, OracleError};
use crate::state::AppState;

use super::aggregate::aggregate;
use super::dto::{ConfirmAction, ConfirmRequest, EvaluationResponse};
use super::normalize::normalize;
use super::types::{DailyIntakeTotal, NormalizedMacros};

const DESCRIBED_FOOD_NAME: &str = "Described Food";

const HIGH_SUGAR_GRAMS: f64 = 10.0;
const HIGH_SUGAR_WARNING: &str = "High Sugar";
const HIGH_SUGAR_SUGGESTION: &str = "Try oats with no added sugar";

/// Failures that surface from an evaluation: both concern the *source* of
/// the candidate macros. Everything past that point (today's total, goal
/// context, the decision call) degrades to a safe default and the
/// evaluation still completes.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("product not found")]
    ProductNotFound,
    #[error("product lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("food description analysis failed: {0}")]
    Describe(#[from] OracleError),
}

/// Evaluates a scanned barcode: external lookup, normalization, then the
/// decision flow.
pub async fn evaluate_barcode(
    state: &AppState,
    email: &str,
    barcode: &str,
) -> Result<EvaluationResponse, EvaluateError> {
    let product = state
        .lookup
        .product(barcode)
        .await?
        .ok_or(EvaluateError::ProductNotFound)?;
    let food = normalize(&product.nutrients);
    Ok(run_decision(
        state,
        email,
        product.name,
        IntakeSource::Barcode,
        food.macros,
        Some(food.serving_size_grams),
        food.note,
    )
    .await)
}

/// Evaluates a free-text food description: the oracle estimates the
/// macros, then the same decision flow runs.
pub async fn evaluate_described(
    state: &AppState,
    email: &str,
    description: &str,
) -> Result<EvaluationResponse, EvaluateError> {
    let macros = state.oracle.describe(description).await?;
    Ok(run_decision(
        state,
        email,
        DESCRIBED_FOOD_NAME.to_string(),
        IntakeSource::Manual,
        macros,
        None,
        None,
    )
    .await)
}

/// The decision half of a session. Today's total and the goal context are
/// independent reads and fetched concurrently; the oracle call waits for
/// both since its request body needs them. Each collaborator is called
/// exactly once; a failed read degrades (zero total / empty goal) and a
/// failed decision fails closed, so the session always reaches a result.
async fn run_decision(
    state: &AppState,
    email: &str,
    food_name: String,
    source: IntakeSource,
    macros: NormalizedMacros,
    serving_size_grams: Option<f64>,
    note: Option<String>,
) -> EvaluationResponse {
    let (daily_total, goal) = tokio::join!(state.ledger.today_total(email), state.goals.fetch(email));
    let daily_total = daily_total.unwrap_or_else(|e| {
        warn!(error = %e, email, "today total unavailable, assuming empty day");
        DailyIntakeTotal::default()
    });
    let goal = goal.unwrap_or_else(|e| {
        warn!(error = %e, email, "goal context unavailable, proceeding without it");
        GoalContext::default()
    });

    let request = DecisionRequest {
        food_macros: macros,
        daily_intake: daily_total,
        user_goal: goal.goal.clone(),
        target_date: goal.target_date.clone(),
    };
    let decision = match state.oracle.decide(&request).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, email, "decision oracle failed, failing closed");
            DecisionResult::fail_closed(&e)
        }
    };

    let warning = (macros.sugar > HIGH_SUGAR_GRAMS).then(|| HIGH_SUGAR_WARNING.to_string());
    let suggestion = warning.as_ref().map(|_| HIGH_SUGAR_SUGGESTION.to_string());

    EvaluationResponse {
        food_name,
        source,
        serving_size_grams,
        macros,
        note,
        warning,
        suggestion,
        projected_total: aggregate(&daily_total, &macros),
        daily_total,
        goal,
        decision,
    }
}

/// Finalizes a session. "skipped" is a pure no-op on the ledger;
/// "consumed" appends exactly once with the macros the user saw,
/// re-sanitized against a mangled client payload. An append failure
/// surfaces: silently dropping a confirmed meal would corrupt the record.
pub async fn confirm(
    state: &AppState,
    request: ConfirmRequest,
) -> Result<Option<IntakeRecord>, LedgerError> {
    match request.action {
        ConfirmAction::Skipped => Ok(None),
        ConfirmAction::Consumed => {
            let record = NewIntakeRecord {
                user_email: request.email,
                food_name: request.food_name,
                source: request.source,
                macros: request.macros.sanitized(),
            };
            state.ledger.append(record).await.map(Some)
        }
    }
}
