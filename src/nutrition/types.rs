use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Canonical per-serving macro profile. Every field is always present and
/// non-negative; unknown inputs normalize to 0, never to NaN or null.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct NormalizedMacros {
    /// kcal, whole number
    pub calories: f64,
    /// grams, one decimal
    pub sugar: f64,
    pub protein: f64,
    /// mapped from saturated fat
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub sodium: f64,
}

/// Sum of all ledger entries for one user on one calendar day. Same shape
/// as a single food's macros, summed field-wise.
pub type DailyIntakeTotal = NormalizedMacros;

/// Nutrient record as it arrives from a product lookup: arbitrary or
/// missing keys, mixed units, per-100g vs per-serving ambiguity.
/// Immutable once received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNutrientRecord {
    pub serving_size: Option<String>,
    pub energy_value: Option<f64>,
    pub energy_unit: Option<String>,
    pub sugars: Option<f64>,
    pub sodium: Option<f64>,
    pub fiber: Option<f64>,
    pub proteins: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub saturated_fat: Option<f64>,
    pub trans_fat: Option<f64>,
}

/// Normalization output: the canonical macros plus metadata the caller may
/// surface. The note flags a suspected per-100g sugar figure; the numeric
/// value itself is never silently corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFood {
    pub macros: NormalizedMacros,
    pub serving_size_grams: f64,
    pub note: Option<String>,
}

pub(crate) fn round_grams(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round_kcal(value: f64) -> f64 {
    value.round_ties_even()
}

fn clean(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl NormalizedMacros {
    /// Clamps every field non-negative and re-applies canonical rounding
    /// (whole kcal, one decimal for the mass-based fields). Applied to
    /// macros that arrive from outside the normalizer: oracle estimates
    /// and client-submitted confirm payloads.
    pub fn sanitized(self) -> Self {
        Self {
            calories: round_kcal(clean(self.calories)),
            sugar: round_grams(clean(self.sugar)),
            protein: round_grams(clean(self.protein)),
            fat: round_grams(clean(self.fat)),
            carbs: round_grams(clean(self.carbs)),
            fiber: round_grams(clean(self.fiber)),
            sodium: round_grams(clean(self.sodium)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_to_zero() {
        let macros: NormalizedMacros = serde_json::from_str(r#"{"calories": 120, "sugar": 4.5}"#).unwrap();
        assert_eq!(macros.calories, 120.0);
        assert_eq!(macros.sugar, 4.5);
        assert_eq!(macros.protein, 0.0);
        assert_eq!(macros.sodium, 0.0);
    }

    #[test]
    fn sanitized_clamps_and_rounds() {
        let macros = NormalizedMacros {
            calories: 250.6,
            sugar: -3.0,
            protein: 7.46,
            fat: f64::NAN,
            carbs: f64::INFINITY,
            fiber: 1.0,
            sodium: 0.04,
        }
        .sanitized();
        assert_eq!(macros.calories, 251.0);
        assert_eq!(macros.sugar, 0.0);
        assert_eq!(macros.protein, 7.5);
        assert_eq!(macros.fat, 0.0);
        assert_eq!(macros.carbs, 0.0);
        assert_eq!(macros.fiber, 1.0);
        assert_eq!(macros.sodium, 0.0);
    }

    #[test]
    fn sanitized_is_identity_on_canonical_macros() {
        let macros = NormalizedMacros {
            calories: 286.0,
            sugar: 15.0,
            protein: 7.5,
            fat: 0.0,
            carbs: 0.0,
            fiber: 0.0,
            sodium: 0.0,
        };
        assert_eq!(macros.sanitized(), macros);
    }
}
