//! Heuristic property valuation.
//!
//! A pure, total estimator: it maps a loosely-typed property record to
//! a price-per-m² estimate, a total, and a diagnostic breakdown of how
//! the figure was derived. It performs no I/O and never fails; fields
//! that are missing or unusable simply skip their adjustment.

pub mod heuristic;
pub mod types;

pub use heuristic::{estimate, estimate_total};
pub use types::{Breakdown, BreakdownComponents, PropertyAttributes, ValuationResult};
