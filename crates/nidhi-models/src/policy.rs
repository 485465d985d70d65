//! Fund-level policy and constraint inputs.
//!
//! Both structs are immutable per calculation and carry *raw* decimal
//! amounts: the unit normalizer infers a single scale factor (raw currency
//! units vs. millions) and converts every monetary field to cents before
//! any arithmetic happens.

use serde::{Deserialize, Serialize};

/// The fund's committed capital and reserve policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundPolicy {
    /// Total committed capital, raw decimal, >= 0. A zero commitment means
    /// the caller supplied none; the engine then treats net contributed
    /// capital as the effective commitment.
    pub commitment: f64,

    /// Target reserve as a fraction of commitment, in [0, 1].
    pub target_reserve_pct: f64,

    /// Cash on hand at the start of the period, raw decimal.
    #[serde(default)]
    pub starting_cash: f64,

    /// Explicit vintage year for the implicit cohort, when the caller
    /// supplies no cohorts.
    #[serde(default)]
    pub vintage_year: Option<i32>,
}

/// Optional guardrails applied on top of the fund policy.
///
/// Caps are advisory portfolio-construction limits, not hard constraints:
/// the allocator clips and spills rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Absolute cash floor, raw decimal. The effective buffer is the larger
    /// of this and the percentage-of-commitment target.
    #[serde(default)]
    pub min_cash_buffer: Option<f64>,

    /// Default per-cohort allocation cap, raw decimal. Combined with each
    /// cohort's own cap by taking the tighter of the two.
    #[serde(default)]
    pub max_allocation_per_cohort: Option<f64>,
}
