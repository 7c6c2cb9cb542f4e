//! The valuation heuristic itself.
//!
//! Ordered pipeline: base rate, category multiplier, user-price blend,
//! then an additive adjustment factor built from condition, age, size
//! and location signals. Every optional input is guarded by a
//! try-parse; anything unusable skips its step.

use serde_json::Value;

use crate::types::{Breakdown, BreakdownComponents, PropertyAttributes, ValuationResult};

/// Fallback base rate, VND per m².
const BASE_RATE_PER_M2: f64 = 20_000_000.0;

/// Year ages are computed against.
const REFERENCE_YEAR: i64 = 2025;

/// City-name substrings that earn the flat location bonus.
const HOT_REGIONS: [&str; 5] = ["hà nội", "hanoi", "hcm", "ho chi minh", "saigon"];

/// Treat a field as set only when it is present and non-empty/non-zero,
/// the convention callers of this API use to mean "left blank".
fn provided(field: Option<&Value>) -> Option<&Value> {
    let v = field?;
    let set = match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    };
    set.then_some(v)
}

/// Strict numeric read: JSON numbers only, no string coercion.
fn as_number(v: &Value) -> Option<f64> {
    v.as_f64()
}

/// Lenient numeric read: JSON numbers, or strings holding a number.
fn parse_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Year read: integers, floats truncated, or integer-literal strings.
fn parse_year(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Lowercased text of a free-form field, empty when absent or not a string.
fn lower_text(field: Option<&Value>) -> String {
    field
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Estimate a property's value from whatever attributes were supplied.
///
/// Pure and total: no I/O, no mutation of the input, and no failure
/// path. Missing or wrong-typed optional fields skip their adjustment.
pub fn estimate(fields: &PropertyAttributes) -> ValuationResult {
    let mut base_per_m2 = BASE_RATE_PER_M2;

    // Category multiplier, mutually exclusive.
    match fields.category.as_ref().and_then(Value::as_str) {
        Some("land") => base_per_m2 *= 1.05,
        Some("house") => base_per_m2 *= 1.02,
        _ => {}
    }

    // Blend with the caller's own total estimate when both sides are
    // genuine non-zero numbers: 40% model, 60% user input.
    if let (Some(price), Some(size)) = (
        provided(fields.price_est_input.as_ref()).and_then(as_number),
        provided(fields.size.as_ref()).and_then(as_number),
    ) {
        let user_per_m2 = price / size;
        base_per_m2 = base_per_m2 * 0.4 + user_per_m2 * 0.6;
    }

    let condition = lower_text(fields.condition.as_ref());
    let region = lower_text(fields.region.as_ref());

    let mut adj = 1.0;

    // Condition keywords, first match wins.
    if contains_any(&condition, &["mới", "new"]) {
        adj += 0.08;
    } else if contains_any(&condition, &["tốt", "good"]) {
        adj += 0.04;
    } else if contains_any(&condition, &["khá", "fair"]) {
        // Graded but neutral; kept distinct from the no-match default.
    } else if contains_any(&condition, &["cũ", "old"]) {
        adj -= 0.12;
    }

    // Age brackets, first match wins. 2..=10 years is neutral.
    let age_years = provided(fields.year_built.as_ref())
        .and_then(parse_year)
        .map(|year| REFERENCE_YEAR - year);
    if let Some(age) = age_years {
        if age > 30 {
            adj -= 0.10;
        } else if age > 20 {
            adj -= 0.07;
        } else if age > 10 {
            adj -= 0.04;
        } else if age < 2 {
            adj += 0.05;
        }
    }

    // Small-area premium, large-area discount. 40..=200 m² is neutral.
    let size_m2 = provided(fields.size.as_ref()).and_then(parse_number);
    if let Some(a) = size_m2 {
        if a < 40.0 {
            adj += 0.05;
        } else if a > 200.0 {
            adj -= 0.06;
        }
    }

    // Flat metro bonus, applied once however many substrings match.
    let location_bonus = if contains_any(&region, &HOT_REGIONS) {
        0.10
    } else {
        0.0
    };
    adj += location_bonus;

    let est_per_m2 = (base_per_m2 * adj).max(0.0);
    let est_total = (est_per_m2 * size_m2.unwrap_or(0.0)).max(0.0);

    ValuationResult {
        est_per_m2: est_per_m2.round() as i64,
        est_total: est_total.round() as i64,
        breakdown: Breakdown {
            base_per_m2: base_per_m2.round() as i64,
            adj_factor: round3(adj),
            components: BreakdownComponents {
                category: fields
                    .category
                    .clone()
                    .unwrap_or_else(|| Value::String("unknown".into())),
                condition_adj: if condition.is_empty() {
                    "unknown".to_string()
                } else {
                    condition
                },
                age_years,
                size: fields.size.clone().unwrap_or(Value::Null),
                region: fields.region.clone().unwrap_or(Value::Null),
                location_bonus,
            },
        },
    }
}

/// Shortcut when only the headline total is needed.
pub fn estimate_total(fields: &PropertyAttributes) -> i64 {
    estimate(fields).est_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(v: serde_json::Value) -> PropertyAttributes {
        serde_json::from_value(v).expect("attributes")
    }

    #[test]
    fn empty_record_yields_base_rate_and_zero_total() {
        let r = estimate(&PropertyAttributes::default());
        assert_eq!(r.est_per_m2, 20_000_000);
        assert_eq!(r.est_total, 0);
        assert_eq!(r.breakdown.base_per_m2, 20_000_000);
        assert_eq!(r.breakdown.adj_factor, 1.0);
    }

    #[test]
    fn category_multipliers_are_mutually_exclusive() {
        let land = estimate(&attrs(json!({"category": "land"})));
        assert_eq!(land.est_per_m2, 21_000_000);
        let house = estimate(&attrs(json!({"category": "house"})));
        assert_eq!(house.est_per_m2, 20_400_000);
        let other = estimate(&attrs(json!({"category": "villa"})));
        assert_eq!(other.est_per_m2, 20_000_000);
    }

    #[test]
    fn user_price_blend_weights_forty_sixty() {
        // user_per_m2 = 1e9 / 50 = 20M; base after land multiplier = 21M.
        let r = estimate(&attrs(json!({
            "category": "land",
            "price_est_input": 1_000_000_000,
            "size": 50
        })));
        assert_eq!(r.breakdown.base_per_m2, 20_400_000);
        assert_eq!(r.est_per_m2, 20_400_000);
        assert_eq!(r.est_total, 1_020_000_000);
    }

    #[test]
    fn blend_requires_real_numbers_on_both_sides() {
        let r = estimate(&attrs(json!({
            "price_est_input": "1000000000",
            "size": 50
        })));
        assert_eq!(r.breakdown.base_per_m2, 20_000_000);

        let r = estimate(&attrs(json!({
            "price_est_input": 1_000_000_000,
            "size": "50"
        })));
        assert_eq!(r.breakdown.base_per_m2, 20_000_000);
    }

    #[test]
    fn blend_skipped_for_zero_price_or_size() {
        let r = estimate(&attrs(json!({"price_est_input": 0, "size": 50})));
        assert_eq!(r.breakdown.base_per_m2, 20_000_000);
        let r = estimate(&attrs(json!({"price_est_input": 1_000_000_000, "size": 0})));
        assert_eq!(r.breakdown.base_per_m2, 20_000_000);
    }

    #[test]
    fn condition_first_match_wins() {
        // Contains both "mới" and "cũ": only the new-condition bonus applies.
        let r = estimate(&attrs(json!({"condition": "mới nhưng hơi cũ"})));
        assert_eq!(r.est_per_m2, 21_600_000);
        assert_eq!(r.breakdown.adj_factor, 1.08);
    }

    #[test]
    fn condition_keywords_map_to_expected_deltas() {
        assert_eq!(estimate(&attrs(json!({"condition": "good"}))).est_per_m2, 20_800_000);
        assert_eq!(estimate(&attrs(json!({"condition": "khá"}))).est_per_m2, 20_000_000);
        assert_eq!(estimate(&attrs(json!({"condition": "nhà cũ"}))).est_per_m2, 17_600_000);
        assert_eq!(estimate(&attrs(json!({"condition": "pristine"}))).est_per_m2, 20_000_000);
    }

    #[test]
    fn fair_outranks_old_in_the_priority_chain() {
        let r = estimate(&attrs(json!({"condition": "khá cũ"})));
        assert_eq!(r.breakdown.adj_factor, 1.0);
    }

    #[test]
    fn condition_match_is_case_insensitive() {
        let r = estimate(&attrs(json!({"condition": "NEW build"})));
        assert_eq!(r.breakdown.adj_factor, 1.08);
    }

    #[test]
    fn age_brackets_are_exclusive() {
        // age 35: only the deepest bracket applies.
        assert_eq!(estimate(&attrs(json!({"year_built": 1990}))).breakdown.adj_factor, 0.90);
        // age 25.
        assert_eq!(estimate(&attrs(json!({"year_built": 2000}))).breakdown.adj_factor, 0.93);
        // age 15.
        assert_eq!(estimate(&attrs(json!({"year_built": 2010}))).breakdown.adj_factor, 0.96);
        // ages 10 and 2: neutral band.
        assert_eq!(estimate(&attrs(json!({"year_built": 2015}))).breakdown.adj_factor, 1.0);
        assert_eq!(estimate(&attrs(json!({"year_built": 2023}))).breakdown.adj_factor, 1.0);
        // age 1: brand-new bonus.
        assert_eq!(estimate(&attrs(json!({"year_built": 2024}))).breakdown.adj_factor, 1.05);
    }

    #[test]
    fn year_parses_from_strings_and_skips_garbage() {
        let r = estimate(&attrs(json!({"year_built": "1990"})));
        assert_eq!(r.breakdown.adj_factor, 0.90);
        assert_eq!(r.breakdown.components.age_years, Some(35));

        let r = estimate(&attrs(json!({"year_built": "199x"})));
        assert_eq!(r.breakdown.adj_factor, 1.0);
        assert_eq!(r.breakdown.components.age_years, None);

        // Zero counts as "not provided".
        let r = estimate(&attrs(json!({"year_built": 0})));
        assert_eq!(r.breakdown.components.age_years, None);
    }

    #[test]
    fn size_brackets_apply_premium_and_discount() {
        assert_eq!(estimate(&attrs(json!({"size": 30}))).breakdown.adj_factor, 1.05);
        assert_eq!(estimate(&attrs(json!({"size": 250}))).breakdown.adj_factor, 0.94);
        assert_eq!(estimate(&attrs(json!({"size": 100}))).breakdown.adj_factor, 1.0);
        // Boundary values sit in the neutral band.
        assert_eq!(estimate(&attrs(json!({"size": 40}))).breakdown.adj_factor, 1.0);
        assert_eq!(estimate(&attrs(json!({"size": 200}))).breakdown.adj_factor, 1.0);
        // Numeric strings are coerced for the size signal.
        assert_eq!(estimate(&attrs(json!({"size": "30"}))).breakdown.adj_factor, 1.05);
    }

    #[test]
    fn unusable_size_contributes_nothing() {
        let r = estimate(&attrs(json!({"size": "big"})));
        assert_eq!(r.breakdown.adj_factor, 1.0);
        assert_eq!(r.est_total, 0);
    }

    #[test]
    fn location_bonus_is_flat_and_non_cumulative() {
        let r = estimate(&attrs(json!({"region": "Hà Nội, Ho Chi Minh"})));
        assert_eq!(r.breakdown.adj_factor, 1.10);
        assert_eq!(r.breakdown.components.location_bonus, 0.10);

        let r = estimate(&attrs(json!({"region": "HANOI"})));
        assert_eq!(r.breakdown.adj_factor, 1.10);

        let r = estimate(&attrs(json!({"region": "Đà Nẵng"})));
        assert_eq!(r.breakdown.adj_factor, 1.0);
        assert_eq!(r.breakdown.components.location_bonus, 0.0);
    }

    #[test]
    fn full_scenario_new_house_in_hanoi() {
        let r = estimate(&attrs(json!({
            "category": "house",
            "size": 30,
            "condition": "mới xây",
            "year_built": 2024,
            "region": "Hà Nội"
        })));
        assert_eq!(r.breakdown.base_per_m2, 20_400_000);
        assert_eq!(r.breakdown.adj_factor, 1.28);
        assert_eq!(r.est_per_m2, 26_112_000);
        assert_eq!(r.est_total, 783_360_000);
    }

    #[test]
    fn totally_garbled_input_still_produces_a_result() {
        let r = estimate(&attrs(json!({
            "category": 7,
            "size": [1, 2],
            "price_est_input": {"a": 1},
            "condition": 3.5,
            "year_built": [],
            "region": true
        })));
        assert_eq!(r.est_per_m2, 20_000_000);
        assert_eq!(r.est_total, 0);
        assert_eq!(r.breakdown.adj_factor, 1.0);
    }

    #[test]
    fn estimate_never_goes_negative() {
        // A large negative user price drives the blended base below zero.
        let r = estimate(&attrs(json!({
            "price_est_input": -1_000_000_000_000i64,
            "size": 50
        })));
        assert_eq!(r.est_per_m2, 0);
        assert_eq!(r.est_total, 0);

        // A negative size would otherwise flip the sign of the total.
        let r = estimate(&attrs(json!({"size": -50})));
        assert!(r.est_per_m2 >= 0);
        assert_eq!(r.est_total, 0);
    }

    #[test]
    fn breakdown_echoes_inputs() {
        let r = estimate(&attrs(json!({
            "condition": "Tốt",
            "size": "45",
            "region": "Hải Phòng"
        })));
        let c = &r.breakdown.components;
        assert_eq!(c.category, json!("unknown"));
        assert_eq!(c.condition_adj, "tốt");
        assert_eq!(c.age_years, None);
        assert_eq!(c.size, json!("45"));
        assert_eq!(c.region, json!("Hải Phòng"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let r = estimate(&attrs(json!({
            "size": 30,
            "bedrooms": 3,
            "legal_status": "sổ đỏ"
        })));
        assert_eq!(r.breakdown.adj_factor, 1.05);
    }

    #[test]
    fn estimate_total_matches_full_result() {
        let fields = attrs(json!({"category": "house", "size": 60}));
        assert_eq!(estimate_total(&fields), estimate(&fields).est_total);
    }
}
