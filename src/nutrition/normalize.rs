use lazy_static::lazy_static;
use regex::Regex;

use super::types::{round_grams, round_kcal, NormalizedFood, NormalizedMacros, RawNutrientRecord};

/// kJ → kcal factor used by the source data.
pub const KCAL_PER_KJ: f64 = 0.239;

/// Assumed reference amount when the serving size is absent or unparseable.
pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

pub const SUGAR_PER_100G_NOTE: &str = "Sugar may be per 100g";

lazy_static! {
    static ref GRAM_AMOUNT: Regex = Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*g\b").unwrap();
    static ref LEADING_AMOUNT: Regex = Regex::new(r"^\s*(\d+(?:[.,]\d+)?)").unwrap();
}

/// Parses the serving size out of a free-form label string ("150g",
/// "2 x 30 g", "1 portion (25g)"). A gram-qualified amount wins over the
/// leading number; anything absent, unparseable or non-positive falls back
/// to 100.
pub fn parse_serving_grams(serving_size: Option<&str>) -> f64 {
    let Some(raw) = serving_size else {
        return DEFAULT_SERVING_GRAMS;
    };
    let grams = GRAM_AMOUNT
        .captures(raw)
        .or_else(|| LEADING_AMOUNT.captures(raw))
        .and_then(|c| c[1].replace(',', ".").parse::<f64>().ok());
    match grams {
        Some(g) if g.is_finite() && g > 0.0 => g,
        _ => DEFAULT_SERVING_GRAMS,
    }
}

/// Mass-based nutrients are assumed reported per 100 units of the source's
/// reference, so they scale only when the serving differs from 100 g.
/// Absent or unparseable values normalize to 0.
fn scale_nutrient(value: Option<f64>, serving_grams: f64) -> f64 {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return 0.0;
    };
    let scaled = if serving_grams != DEFAULT_SERVING_GRAMS {
        v * serving_grams / 100.0
    } else {
        v
    };
    round_grams(scaled).max(0.0)
}

/// Energy resolution branch table, kept as-is from the source policy
/// rather than replaced by "smart" inference:
///
/// - explicit kJ: convert to whole kcal, then serving-scale;
/// - explicit kcal: taken as already per-serving, no serving scaling
///   (deliberate asymmetry);
/// - any other explicit unit: unresolvable, 0;
/// - unit absent, serving ≠ 100 g: kJ-like serving scaling, no conversion;
/// - unit absent, serving = 100 g: treated as kJ;
/// - value absent: 0.
fn resolve_energy(value: Option<f64>, unit: Option<&str>, serving_grams: f64) -> f64 {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return 0.0;
    };
    let unit = unit.map(|u| u.trim().to_ascii_lowercase());
    let kcal = match unit.as_deref() {
        Some("kcal") => v,
        Some("kj") => {
            let per_reference = round_kcal(v * KCAL_PER_KJ);
            if serving_grams != DEFAULT_SERVING_GRAMS {
                per_reference * serving_grams / 100.0
            } else {
                per_reference
            }
        }
        Some(_) => 0.0,
        None if serving_grams != DEFAULT_SERVING_GRAMS => v * serving_grams / 100.0,
        None => v * KCAL_PER_KJ,
    };
    round_kcal(kcal).max(0.0)
}

/// Turns a raw nutrient record into the canonical per-serving macro set.
/// Total function: every input produces a deterministic result with all
/// seven fields numeric and non-negative. Detected inconsistency is
/// flagged via the note, never corrected.
pub fn normalize(raw: &RawNutrientRecord) -> NormalizedFood {
    let serving_size_grams = parse_serving_grams(raw.serving_size.as_deref());
    let macros = NormalizedMacros {
        calories: resolve_energy(raw.energy_value, raw.energy_unit.as_deref(), serving_size_grams),
        sugar: scale_nutrient(raw.sugars, serving_size_grams),
        protein: scale_nutrient(raw.proteins, serving_size_grams),
        fat: scale_nutrient(raw.saturated_fat, serving_size_grams),
        carbs: scale_nutrient(raw.carbohydrates, serving_size_grams),
        fiber: scale_nutrient(raw.fiber, serving_size_grams),
        sodium: scale_nutrient(raw.sodium, serving_size_grams),
    };
    let note = (macros.sugar > serving_size_grams).then(|| SUGAR_PER_100G_NOTE.to_string());
    NormalizedFood {
        macros,
        serving_size_grams,
        note,
    }
}
