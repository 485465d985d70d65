//! Largest-remainder allocator.
//!
//! Distributes an integer number of cents across the canonically-ordered
//! cohort list so the shares sum exactly to the pool: integer floor shares
//! first, then the leftover cents to the largest remainders, ties broken
//! by canonical position. Remainders are exact integers on the weight
//! scale; floating-point remainders compare inconsistently near ties and
//! are never used.

use nidhi_models::{Allocation, AllocationKind, Cents};
use tracing::debug;

use crate::cohorts::ResolvedCohort;
use crate::units::FRACTION_SCALE;

/// The allocator's output: one planned allocation per cohort in canonical
/// order, plus what could not be placed because every cohort was capped.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AllocationOutcome {
    pub allocations: Vec<Allocation>,
    pub total_allocated_cents: Cents,
    /// Cap-bound leftover; stays in the reserve balance. Not a violation:
    /// caps are advisory portfolio-construction guardrails.
    pub unplaced_cents: Cents,
}

pub(crate) fn allocate(allocable_cents: Cents, cohorts: &[ResolvedCohort]) -> AllocationOutcome {
    debug_assert!(allocable_cents >= 0);
    debug_assert!(!cohorts.is_empty());

    let pool = i128::from(allocable_cents);
    let scale = i128::from(FRACTION_SCALE);

    // Integer floor shares and exact remainders on the weight scale.
    let mut shares: Vec<i128> = Vec::with_capacity(cohorts.len());
    let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(cohorts.len());
    let mut assigned = 0_i128;
    for (index, cohort) in cohorts.iter().enumerate() {
        let product = pool * i128::from(cohort.weight_ppm);
        shares.push(product / scale);
        remainders.push((index, product % scale));
        assigned += product / scale;
    }

    // Shortfall cents go one at a time to the largest remainders; exact
    // ties break by canonical index, lower wins.
    let shortfall = pool - assigned;
    remainders.sort_by(|(ai, ar), (bi, br)| br.cmp(ar).then(ai.cmp(bi)));
    for &(index, _) in remainders.iter().take(shortfall as usize) {
        shares[index] += 1;
    }

    // Clip to effective caps, then spill the excess forward into whatever
    // headroom remains, repeating until placed or every cohort is capped.
    let mut excess = 0_i128;
    for (share, cohort) in shares.iter_mut().zip(cohorts) {
        if let Some(cap) = cohort.cap_cents {
            let cap = i128::from(cap);
            if *share > cap {
                excess += *share - cap;
                *share = cap;
            }
        }
    }
    while excess > 0 {
        let mut placed = 0_i128;
        for (share, cohort) in shares.iter_mut().zip(cohorts) {
            if excess == 0 {
                break;
            }
            let headroom = match cohort.cap_cents {
                Some(cap) => i128::from(cap) - *share,
                None => excess,
            };
            let take = headroom.min(excess);
            if take > 0 {
                *share += take;
                excess -= take;
                placed += take;
            }
        }
        if placed == 0 {
            break;
        }
    }

    let total: i128 = shares.iter().sum();
    let allocations = cohorts
        .iter()
        .zip(&shares)
        .map(|(cohort, share)| Allocation {
            cohort_id: cohort.id.clone(),
            amount_cents: *share as Cents,
            kind: AllocationKind::Planned,
        })
        .collect();

    debug!(
        pool = allocable_cents,
        total = total as Cents,
        unplaced = excess as Cents,
        "allocation complete"
    );

    AllocationOutcome {
        allocations,
        total_allocated_cents: total as Cents,
        unplaced_cents: excess as Cents,
    }
}
