//! Serialized request envelope.

use serde::{Deserialize, Serialize};

use crate::cohort::CohortSpec;
use crate::flows::CashFlow;
use crate::policy::{Constraints, FundPolicy};

/// Everything one calculation consumes, as a single serializable value.
///
/// Callers holding the four parts separately can call the engine directly;
/// the envelope exists for adapters (the `alloc-check` CLI, queue
/// consumers) that move a whole request as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Commitment and reserve policy.
    pub policy: FundPolicy,
    /// Optional guardrails.
    #[serde(default)]
    pub constraints: Constraints,
    /// Dated contributions and distributions.
    #[serde(default)]
    pub cash_flows: Vec<CashFlow>,
    /// Caller-defined cohorts; empty means one implicit vintage cohort.
    #[serde(default)]
    pub cohorts: Vec<CohortSpec>,
}
