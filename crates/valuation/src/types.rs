use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw property record as received from callers.
///
/// Every field is optional and deliberately loose (`Value`): callers
/// send partially-filled forms, and a wrong-typed field must skip its
/// adjustment instead of failing the whole request. Unknown keys are
/// ignored on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyAttributes {
    /// Property type tag, e.g. "land" or "house".
    pub category: Option<Value>,
    /// Area in m².
    pub size: Option<Value>,
    /// User-supplied total price estimate, if any.
    pub price_est_input: Option<Value>,
    /// Free-text condition description.
    pub condition: Option<Value>,
    /// Construction year.
    pub year_built: Option<Value>,
    /// Free-text location, matched against known city names.
    pub region: Option<Value>,
}

/// Final estimate plus the transparency breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Estimated price per m², VND, rounded. Never negative.
    pub est_per_m2: i64,
    /// Estimated total price, VND, rounded. Never negative.
    pub est_total: i64,
    pub breakdown: Breakdown,
}

/// Intermediate figures exposed for auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakdown {
    /// Base rate after category multiplier and user-price blending.
    pub base_per_m2: i64,
    /// Accumulated adjustment factor, rounded to 3 decimals.
    pub adj_factor: f64,
    pub components: BreakdownComponents,
}

/// Echo of the signals that fed the adjustment factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownComponents {
    /// Raw category value, or "unknown" when absent.
    pub category: Value,
    /// Lowercased condition text, or "unknown" when empty.
    pub condition_adj: String,
    /// Age in years relative to the reference year, when known.
    pub age_years: Option<i64>,
    /// Raw size value as supplied.
    pub size: Value,
    /// Raw region value as supplied.
    pub region: Value,
    /// 0.10 when a known metro matched, otherwise 0.
    pub location_bonus: f64,
}
