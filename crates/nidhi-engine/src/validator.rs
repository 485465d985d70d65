//! Conservation invariant validator and violation classifier.
//!
//! Re-derives both conservation identities from the allocator's output and
//! the raw flow list, never from a total the producing stage also emits;
//! a tautological self-check would hide exactly the bugs this stage
//! exists to catch. Identity breaches and negative balances are fatal;
//! everything advisory has already been self-corrected upstream and is
//! re-checked here against the emitted output.

use std::collections::BTreeMap;

use nidhi_models::{
    Allocation, AllocationKind, Cents, ConservationIdentity, EngineError, FlowKind, Violation,
    ViolationKind,
};
use tracing::debug;

use crate::cohorts::ResolvedCohort;
use crate::ledger::LedgerSummary;
use crate::units::NormalizedInputs;

pub(crate) fn validate(
    normalized: &NormalizedInputs,
    ledger: &LedgerSummary,
    allocations: &[Allocation],
    cohorts: &[ResolvedCohort],
    reserve_balance_cents: Cents,
    remaining_capacity_cents: Cents,
) -> Result<Vec<Violation>, EngineError> {
    // Independent sub-totals.
    let mut contributions = 0_i128;
    let mut distributions = 0_i128;
    for flow in &normalized.flows {
        match flow.kind {
            FlowKind::Contribution => contributions += i128::from(flow.amount_cents),
            FlowKind::Distribution => distributions += i128::from(flow.amount_cents),
        }
    }
    let deployed: i128 = allocations
        .iter()
        .map(|a| i128::from(a.amount_cents))
        .sum();

    // Cash identity: starting + contributions - distributions - deployed
    // == reserve balance, exact in cents.
    let cash_lhs =
        i128::from(normalized.starting_cash_cents) + contributions - distributions - deployed;
    if cash_lhs != i128::from(reserve_balance_cents) {
        return Err(EngineError::ConservationViolation {
            identity: ConservationIdentity::Cash,
            expected_cents: cash_lhs as Cents,
            actual_cents: reserve_balance_cents,
        });
    }

    // Capacity identity: commitment == allocations + remaining capacity.
    let capacity_rhs = deployed + i128::from(remaining_capacity_cents);
    if capacity_rhs != i128::from(ledger.effective_commitment_cents) {
        return Err(EngineError::ConservationViolation {
            identity: ConservationIdentity::Capacity,
            expected_cents: ledger.effective_commitment_cents,
            actual_cents: capacity_rhs as Cents,
        });
    }

    if reserve_balance_cents < 0 {
        return Err(EngineError::NegativeBalance {
            ending_cash_cents: reserve_balance_cents,
        });
    }
    if remaining_capacity_cents < 0 {
        return Err(EngineError::NegativeCapacity {
            remaining_capacity_cents,
        });
    }

    let mut violations = Vec::new();

    // Re-checks of the allocator's self-corrections over the emitted
    // output. None of these fire by construction; an emitted breach means
    // the clipping or spill-over logic regressed.
    let mut planned_by_cohort: BTreeMap<&str, i128> = BTreeMap::new();
    let mut deployed_by_cohort: BTreeMap<&str, i128> = BTreeMap::new();
    for allocation in allocations {
        let bucket = match allocation.kind {
            AllocationKind::Planned => &mut planned_by_cohort,
            AllocationKind::Deployed => &mut deployed_by_cohort,
        };
        *bucket.entry(allocation.cohort_id.as_str()).or_default() +=
            i128::from(allocation.amount_cents);
    }

    for cohort in cohorts {
        let planned = planned_by_cohort
            .get(cohort.id.as_str())
            .copied()
            .unwrap_or(0);
        if let Some(cap) = cohort.cap_cents {
            if planned > i128::from(cap) {
                violations.push(Violation::warning_for_cohort(
                    ViolationKind::CapExceeded,
                    cohort.id.clone(),
                    format!("allocated {planned} cents against a cap of {cap} cents"),
                ));
            }
        }
        let cohort_deployed = deployed_by_cohort
            .get(cohort.id.as_str())
            .copied()
            .unwrap_or(0);
        if cohort_deployed > planned {
            violations.push(Violation::warning_for_cohort(
                ViolationKind::OverAllocation,
                cohort.id.clone(),
                format!("deployed {cohort_deployed} cents exceeds planned {planned} cents"),
            ));
        }
    }

    if deployed > i128::from(ledger.allocable_cents) {
        violations.push(Violation::warning(
            ViolationKind::OverAllocation,
            format!(
                "allocated {deployed} cents from a pool of {} cents",
                ledger.allocable_cents
            ),
        ));
    }

    debug!(
        advisory = violations.len(),
        "conservation identities re-derived"
    );
    Ok(violations)
}
