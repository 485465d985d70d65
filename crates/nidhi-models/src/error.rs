//! The fatal error taxonomy.

use serde::{Deserialize, Serialize};

use crate::Cents;

/// Errors that abort a calculation.
///
/// A closed sum type with one variant per failure kind; exhaustive matching
/// at the caller boundary replaces open-ended subclassing. Every variant
/// carries the structured context a caller needs to render an actionable
/// message. None of these are retried internally: each indicates invalid
/// input or an engine bug, never a transient condition.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineError {
    /// Monetary fields are inconsistently scaled (e.g. commitment in
    /// millions next to a buffer in raw units). Never silently corrected:
    /// guessing a unit error can corrupt financial totals undetectably.
    #[error(
        "unit mismatch: |{max_field}| / |{min_field}| = {ratio:.1}x exceeds {limit:.0}x; \
         monetary fields must share one scale"
    )]
    UnitMismatch {
        min_field: String,
        max_field: String,
        ratio: f64,
        limit: f64,
    },

    /// A boundary decimal was non-finite or outside the representable
    /// cents range.
    #[error("invalid amount for {field}: {value} is not a representable monetary value")]
    InvalidAmount { field: String, value: f64 },

    /// A cohort weight outside (0, 1].
    #[error("invalid weight {weight} for cohort {cohort_id}: weights must be in (0, 1]")]
    InvalidWeight { cohort_id: String, weight: f64 },

    /// Cohort weights sum too far from 1.0 to normalize safely.
    #[error(
        "cohort weights sum to {sum}, more than {tolerance} away from 1.0; \
         refusing to normalize a deviation that large"
    )]
    WeightSumError { sum: f64, tolerance: f64 },

    /// Two cohorts share an id.
    #[error("duplicate cohort id {cohort_id}: cohorts form a set keyed by id")]
    DuplicateCohort { cohort_id: String },

    /// Cash went negative.
    #[error("negative cash balance: {ending_cash_cents} cents at period end")]
    NegativeBalance { ending_cash_cents: Cents },

    /// Commitment capacity went negative.
    #[error("negative remaining capacity: {remaining_capacity_cents} cents")]
    NegativeCapacity { remaining_capacity_cents: Cents },

    /// A conservation identity failed to re-derive; signals an engine bug
    /// rather than bad input.
    #[error(
        "conservation violation ({identity}): expected {expected_cents} cents, \
         got {actual_cents} cents"
    )]
    ConservationViolation {
        identity: ConservationIdentity,
        expected_cents: Cents,
        actual_cents: Cents,
    },
}

/// Which of the two conservation identities failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationIdentity {
    /// starting cash + contributions - distributions - deployed == reserve.
    Cash,
    /// commitment == allocations + remaining capacity.
    Capacity,
}

impl std::fmt::Display for ConservationIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConservationIdentity::Cash => write!(f, "cash"),
            ConservationIdentity::Capacity => write!(f, "capacity"),
        }
    }
}
