//! Output assembler.
//!
//! Packages the final result with every collection present (possibly
//! empty), each collection in its canonical order, and the deterministic
//! content digest. Re-running the same input through the pipeline any
//! number of times yields byte-identical serialized output.

use nidhi_models::{Allocation, CalculationResult, Cents, Violation, RESULT_SCHEMA};

pub(crate) fn assemble(
    reserve_balance_cents: Cents,
    mut allocations: Vec<Allocation>,
    remaining_capacity_cents: Cents,
    cumulative_deployed_cents: Cents,
    mut violations: Vec<Violation>,
) -> CalculationResult {
    // Byte-wise orderings only; locale collation is non-deterministic
    // across environments.
    allocations.sort_by(|a, b| {
        a.cohort_id
            .cmp(&b.cohort_id)
            .then_with(|| a.kind.cmp(&b.kind))
    });
    violations.sort_by(|a, b| {
        option_last(&a.period)
            .cmp(&option_last(&b.period))
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| option_last(&a.cohort_id).cmp(&option_last(&b.cohort_id)))
    });

    let digest = CalculationResult::compute_digest(
        reserve_balance_cents,
        &allocations,
        remaining_capacity_cents,
        cumulative_deployed_cents,
        &violations,
    );

    CalculationResult {
        schema_version: RESULT_SCHEMA.to_string(),
        reserve_balance_cents,
        allocations_by_cohort: allocations,
        remaining_capacity_cents,
        cumulative_deployed_cents,
        violations,
        digest,
    }
}

/// Sort key that places `None` after every `Some`.
fn option_last<'a>(value: &'a Option<String>) -> (bool, Option<&'a str>) {
    (value.is_none(), value.as_deref())
}
