//! Per-cohort capacity allocations.

use serde::{Deserialize, Serialize};

use crate::Cents;

/// Whether an allocation is an earmark against commitment or cash that has
/// actually left the fund.
///
/// Invariant: for any cohort, cumulative deployed never exceeds cumulative
/// planned. The engine's single-period model deploys the full plan at
/// period close, so the totals coincide; the distinction remains for
/// consumers that track partial deployment downstream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AllocationKind {
    /// Capacity earmarked against commitment.
    Planned,
    /// Cash sent to a portfolio company.
    Deployed,
}

impl AllocationKind {
    /// Stable name used in digests and display output.
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationKind::Planned => "planned",
            AllocationKind::Deployed => "deployed",
        }
    }
}

/// Capacity assigned to a single cohort. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// The cohort receiving this allocation.
    pub cohort_id: String,
    /// Allocated amount in cents, >= 0.
    pub amount_cents: Cents,
    /// Earmark or outflow.
    pub kind: AllocationKind,
}
