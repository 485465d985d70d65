//! # Nidhi Engine
//!
//! Deterministic capital allocation: commitment, cash flows, and cohort
//! policy in; reserved cash, per-cohort capacity allocations, and policy
//! violations out, bit-for-bit identical across repeated runs and across
//! machines.
//!
//! ## Hard Laws
//! 1. The calculation is a pure function of its inputs (same inputs ->
//!    identical result digest). No clock, randomness, locale, or I/O.
//! 2. All monetary arithmetic is exact integer cents; floats exist only at
//!    the decimal boundary, converted once with banker's rounding.
//! 3. Two conservation identities are re-derived independently before any
//!    result is returned: the cash ledger and the commitment-capacity
//!    ledger.
//! 4. Fatal findings abort with a structured [`EngineError`]; advisory
//!    findings are self-corrected upstream and recorded as warnings.
//! 5. Output collections are always present and canonically ordered.
//!
//! ## Pipeline
//! `units` -> `cohorts` -> `ledger` -> `allocator` -> `validator` ->
//! `assembler`, strictly top to bottom; no stage calls back into an
//! earlier one.
//!
//! ## Usage
//! ```
//! use nidhi_engine::calculate;
//! use nidhi_models::{CashFlow, CohortSpec, Constraints, FlowKind, FundPolicy};
//!
//! let policy = FundPolicy {
//!     commitment: 0.0,
//!     target_reserve_pct: 0.2,
//!     starting_cash: 0.0,
//!     vintage_year: Some(2024),
//! };
//! let flows = vec![CashFlow {
//!     date: "2024-01-15".parse().unwrap(),
//!     amount: 100.0,
//!     kind: FlowKind::Contribution,
//! }];
//! let result = calculate(&policy, &Constraints::default(), &flows, &[]).unwrap();
//! assert_eq!(result.allocations_by_cohort.len(), 1);
//! ```

mod allocator;
mod assembler;
mod cohorts;
mod ledger;
mod rounding;
mod units;
mod validator;

use nidhi_models::{
    CalculationRequest, CalculationResult, CashFlow, CohortSpec, Constraints, EngineError,
    FundPolicy,
};
use tracing::debug;

/// Run one calculation.
///
/// Pure and re-entrant: every input is read-only, the result is freshly
/// constructed, and concurrent calls need no coordination. Errors are
/// fatal and structured; warnings ride inside the result's `violations`.
pub fn calculate(
    policy: &FundPolicy,
    constraints: &Constraints,
    cash_flows: &[CashFlow],
    cohorts: &[CohortSpec],
) -> Result<CalculationResult, EngineError> {
    let normalized = units::normalize(policy, constraints, cash_flows, cohorts)?;
    let resolved = cohorts::resolve(cohorts, policy, &normalized)?;
    let ledger = ledger::settle(&normalized)?;
    let outcome = allocator::allocate(ledger.allocable_cents, &resolved);

    // Everything not allocated stays held back in the reserve balance;
    // the whole plan deploys at period close.
    let reserve_balance_cents = ledger.gross_cash_cents - outcome.total_allocated_cents;
    let remaining_capacity_cents =
        ledger.effective_commitment_cents - outcome.total_allocated_cents;
    let cumulative_deployed_cents = outcome.total_allocated_cents;

    let advisory = validator::validate(
        &normalized,
        &ledger,
        &outcome.allocations,
        &resolved,
        reserve_balance_cents,
        remaining_capacity_cents,
    )?;
    let mut violations = ledger.warnings;
    violations.extend(advisory);

    debug!(
        reserve_balance_cents,
        remaining_capacity_cents,
        cumulative_deployed_cents,
        violations = violations.len(),
        "calculation complete"
    );

    Ok(assembler::assemble(
        reserve_balance_cents,
        outcome.allocations,
        remaining_capacity_cents,
        cumulative_deployed_cents,
        violations,
    ))
}

/// [`calculate`] over a serialized request envelope.
pub fn calculate_request(request: &CalculationRequest) -> Result<CalculationResult, EngineError> {
    calculate(
        &request.policy,
        &request.constraints,
        &request.cash_flows,
        &request.cohorts,
    )
}
