//! The aggregate calculation result.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::allocation::Allocation;
use crate::violation::Violation;
use crate::Cents;

/// Schema version stamped on every result.
pub const RESULT_SCHEMA: &str = "calculation_result_v1.0";

/// The sole output of a calculation. Constructed once by the output
/// assembler and never mutated.
///
/// Collection fields are always present (an empty list, never an absent
/// field), so downstream consumers never have to distinguish "no data"
/// from "field missing". Re-running the same input yields byte-identical
/// serialized output and an identical digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Schema version of this artifact.
    pub schema_version: String,

    /// Held-back portion of cash after allocation, in cents.
    pub reserve_balance_cents: Cents,

    /// One allocation per cohort, sorted by cohort id ascending.
    pub allocations_by_cohort: Vec<Allocation>,

    /// Commitment capacity not yet allocated, in cents.
    pub remaining_capacity_cents: Cents,

    /// Total cash deployed into cohorts this period, in cents.
    pub cumulative_deployed_cents: Cents,

    /// Advisory findings, sorted by (period, kind, cohort id) with missing
    /// period/cohort sorting last.
    pub violations: Vec<Violation>,

    /// Deterministic SHA-256 digest over every field above.
    pub digest: String,
}

impl CalculationResult {
    /// Compute the deterministic digest for a result's parts.
    ///
    /// Integers are hashed as little-endian bytes, enums as their stable
    /// names, options with a presence marker byte. No wall-clock material
    /// participates.
    pub fn compute_digest(
        reserve_balance_cents: Cents,
        allocations: &[Allocation],
        remaining_capacity_cents: Cents,
        cumulative_deployed_cents: Cents,
        violations: &[Violation],
    ) -> String {
        let mut hasher = Sha256::new();

        hasher.update(RESULT_SCHEMA.as_bytes());
        hasher.update(reserve_balance_cents.to_le_bytes());

        for alloc in allocations {
            hasher.update(alloc.cohort_id.as_bytes());
            hasher.update(alloc.amount_cents.to_le_bytes());
            hasher.update(alloc.kind.as_str().as_bytes());
        }

        hasher.update(remaining_capacity_cents.to_le_bytes());
        hasher.update(cumulative_deployed_cents.to_le_bytes());

        for violation in violations {
            hasher.update(violation.kind.as_str().as_bytes());
            hasher.update(violation.severity.as_str().as_bytes());
            hash_opt(&mut hasher, violation.cohort_id.as_deref());
            hash_opt(&mut hasher, violation.period.as_deref());
            hasher.update(violation.message.as_bytes());
        }

        format!("{:x}", hasher.finalize())
    }
}

fn hash_opt(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            hasher.update(v.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}
