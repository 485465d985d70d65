//! # Nidhi Models
//!
//! Canonical data model for the deterministic capital allocation engine.
//! All monetary quantities that cross the engine boundary arrive as raw
//! decimals in an unknown but internally consistent scale; everything the
//! engine computes with, and everything it emits, is integer minor units
//! (cents). No type in this crate reads the clock, mints random identity,
//! or depends on locale.
//!
//! ## Type Groups
//! - `policy` - `FundPolicy` and `Constraints` (caller-supplied, immutable)
//! - `flows` - dated contribution/distribution cash flows
//! - `cohort` - caller-defined or synthesized allocation buckets
//! - `allocation` - per-cohort capacity assignments (planned/deployed)
//! - `violation` - advisory findings from the invariant validator
//! - `result` - the aggregate `CalculationResult` with deterministic digest
//! - `error` - the closed `EngineError` taxonomy (fatal tier)

pub mod allocation;
pub mod cohort;
pub mod error;
pub mod flows;
pub mod policy;
pub mod request;
pub mod result;
pub mod violation;

pub use allocation::{Allocation, AllocationKind};
pub use cohort::CohortSpec;
pub use error::{ConservationIdentity, EngineError};
pub use flows::{CashFlow, FlowKind};
pub use policy::{Constraints, FundPolicy};
pub use request::CalculationRequest;
pub use result::{CalculationResult, RESULT_SCHEMA};
pub use violation::{Severity, Violation, ViolationKind};

/// Integer minor units (cents). Wide enough for fund sizes up to the low
/// quadrillions of minor units without overflow in accumulation.
pub type Cents = i64;
