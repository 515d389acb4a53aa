use serde::{Deserialize, Serialize};

use crate::goals::GoalContext;
use crate::intake::{IntakeRecord, IntakeSource};
use crate::oracle::DecisionResult;

use super::types::{DailyIntakeTotal, NormalizedMacros};

#[derive(Debug, Deserialize)]
pub struct BarcodeRequest {
    pub email: String,
    pub barcode: String,
}

#[derive(Debug, Deserialize)]
pub struct DescribeRequest {
    pub email: String,
    pub description: String,
}

/// Everything one food-evaluation session produced, handed back to the
/// presentation layer in one piece.
#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub food_name: String,
    pub source: IntakeSource,
    /// Present for barcode lookups; a described food has no label serving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size_grams: Option<f64>,
    pub macros: NormalizedMacros,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Today's total before this food.
    pub daily_total: DailyIntakeTotal,
    /// Today's total if this food is consumed.
    pub projected_total: DailyIntakeTotal,
    pub goal: GoalContext,
    pub decision: DecisionResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmAction {
    Consumed,
    Skipped,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    pub food_name: String,
    pub source: IntakeSource,
    pub macros: NormalizedMacros,
    pub action: ConfirmAction,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<IntakeRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_request_deserializes_with_partial_macros() {
        let request: ConfirmRequest = serde_json::from_str(
            r#"{
                "email": "a@b.c",
                "food_name": "Granola",
                "source": "barcode",
                "macros": { "calories": 286, "sugar": 15.0 },
                "action": "consumed"
            }"#,
        )
        .unwrap();
        assert_eq!(request.action, ConfirmAction::Consumed);
        assert_eq!(request.source, IntakeSource::Barcode);
        assert_eq!(request.macros.calories, 286.0);
        assert_eq!(request.macros.protein, 0.0);
    }
}
