use super::types::{round_grams, round_kcal, DailyIntakeTotal, NormalizedMacros};

/// Merges one food's macros into a daily running total. Field-wise sum,
/// pure, order-insensitive. Each sum is re-rounded to the canonical
/// precision (whole kcal, one decimal for the mass-based fields); raw
/// f64 addition is not associative, so without the rounding the same
/// entries merged in two orders can drift apart in the last bits.
/// Fields missing from a partially-shaped input are already 0 by the
/// time they get here (serde defaults), so a gap in the data never
/// propagates a failure.
pub fn aggregate(total: &DailyIntakeTotal, candidate: &NormalizedMacros) -> DailyIntakeTotal {
    NormalizedMacros {
        calories: round_kcal(total.calories + candidate.calories),
        sugar: round_grams(total.sugar + candidate.sugar),
        protein: round_grams(total.protein + candidate.protein),
        fat: round_grams(total.fat + candidate.fat),
        carbs: round_grams(total.carbs + candidate.carbs),
        fiber: round_grams(total.fiber + candidate.fiber),
        sodium: round_grams(total.sodium + candidate.sodium),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: f64) -> NormalizedMacros {
        NormalizedMacros {
            calories: 100.0 * seed,
            sugar: 1.5 * seed,
            protein: 2.0 * seed,
            fat: 0.5 * seed,
            carbs: 10.0 * seed,
            fiber: 0.7 * seed,
            sodium: 0.1 * seed,
        }
    }

    #[test]
    fn sums_field_wise() {
        let total = NormalizedMacros {
            calories: 1200.0,
            sugar: 30.0,
            protein: 45.0,
            fat: 20.0,
            carbs: 150.0,
            fiber: 12.0,
            sodium: 1.8,
        };
        let candidate = NormalizedMacros {
            calories: 300.0,
            sugar: 12.0,
            protein: 8.0,
            fat: 3.0,
            carbs: 40.0,
            fiber: 2.0,
            sodium: 0.4,
        };
        let merged = aggregate(&total, &candidate);
        assert_eq!(merged.calories, 1500.0);
        assert_eq!(merged.sugar, 42.0);
        assert_eq!(merged.protein, 53.0);
        assert_eq!(merged.fat, 23.0);
        assert_eq!(merged.carbs, 190.0);
        assert_eq!(merged.fiber, 14.0);
        assert_eq!(merged.sodium, 2.2);
    }

    #[test]
    fn addition_order_does_not_matter() {
        let base = sample(3.0);
        let a = sample(1.0);
        let b = sample(2.0);
        assert_eq!(aggregate(&aggregate(&base, &a), &b), aggregate(&aggregate(&base, &b), &a));
    }

    // 0.3 + 0.1 + 0.2 is the classic case where raw f64 sums diverge by
    // order (one order lands on 0.6000000000000001).
    #[test]
    fn inexact_decimal_fractions_sum_to_the_same_total_in_any_order() {
        let base = NormalizedMacros { sodium: 0.3, ..Default::default() };
        let a = NormalizedMacros { sodium: 0.1, ..Default::default() };
        let b = NormalizedMacros { sodium: 0.2, ..Default::default() };

        let ab = aggregate(&aggregate(&base, &a), &b);
        let ba = aggregate(&aggregate(&base, &b), &a);
        assert_eq!(ab, ba);
        assert_eq!(ab.sodium, 0.6);
    }

    #[test]
    fn partially_shaped_input_reads_missing_fields_as_zero() {
        let partial: NormalizedMacros = serde_json::from_str(r#"{"calories": 250}"#).unwrap();
        let merged = aggregate(&NormalizedMacros::default(), &partial);
        assert_eq!(merged.calories, 250.0);
        assert_eq!(merged.sugar, 0.0);
        assert_eq!(merged.fiber, 0.0);
    }
}
