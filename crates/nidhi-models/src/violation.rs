//! Advisory findings from the invariant validator.

use serde::{Deserialize, Serialize};

/// The closed set of constraint breaches the validator can report.
///
/// The derived ordering (declaration order) is the canonical sort order for
/// the result's violation list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The effective buffer could not be satisfied even at zero allocation.
    BufferBreach,
    /// The allocable cash pool exceeded remaining commitment capacity and
    /// was clipped, or an emitted total exceeded the pool.
    OverAllocation,
    /// An emitted allocation exceeded a cohort's effective cap.
    CapExceeded,
    /// Cash went negative.
    NegativeBalance,
    /// Commitment capacity went negative.
    NegativeCapacity,
}

impl ViolationKind {
    /// Stable name used in digests and display output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::BufferBreach => "buffer_breach",
            ViolationKind::OverAllocation => "over_allocation",
            ViolationKind::CapExceeded => "cap_exceeded",
            ViolationKind::NegativeBalance => "negative_balance",
            ViolationKind::NegativeCapacity => "negative_capacity",
        }
    }
}

/// How a violation affects the calculation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Recorded in the result; the allocator already self-corrected.
    Warning,
    /// Aborts the calculation. Error-severity findings surface as
    /// `EngineError` returns and never appear in a result.
    Error,
}

impl Severity {
    /// Stable name used in digests and display output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single recorded constraint breach.
///
/// A warning reaching the output means "constraint was tight but
/// satisfiable", never "constraint was violated in the output".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Which constraint was breached.
    pub kind: ViolationKind,
    /// Warning or (never-emitted) error severity.
    pub severity: Severity,
    /// The cohort involved, when the breach is cohort-scoped.
    #[serde(default)]
    pub cohort_id: Option<String>,
    /// The period involved, when the breach is period-scoped.
    #[serde(default)]
    pub period: Option<String>,
    /// Human-readable description with the relevant amounts.
    pub message: String,
}

impl Violation {
    /// A warning with no cohort or period scope.
    pub fn warning(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            cohort_id: None,
            period: None,
            message: message.into(),
        }
    }

    /// A warning scoped to one cohort.
    pub fn warning_for_cohort(
        kind: ViolationKind,
        cohort_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            cohort_id: Some(cohort_id.into()),
            period: None,
            message: message.into(),
        }
    }
}
