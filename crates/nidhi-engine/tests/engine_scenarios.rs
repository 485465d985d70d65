//! End-to-end scenarios for the allocation pipeline.
//!
//! These exercise the documented behaviors a caller relies on: the reserve
//! arithmetic, unit-mismatch rejection, largest-remainder apportionment,
//! advisory cap handling, and byte-for-byte determinism across runs.

use chrono::NaiveDate;
use nidhi_engine::calculate;
use nidhi_models::{
    CashFlow, CohortSpec, Constraints, EngineError, FlowKind, FundPolicy, ViolationKind,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn flow(day: &str, amount: f64, kind: FlowKind) -> CashFlow {
    CashFlow {
        date: date(day),
        amount,
        kind,
    }
}

fn cohort(id: &str, start: &str, weight: f64, cap: Option<f64>) -> CohortSpec {
    CohortSpec {
        id: id.to_string(),
        name: id.to_uppercase(),
        start_date: Some(date(start)),
        weight,
        cap,
    }
}

#[test]
fn single_cohort_twenty_pct_reserve() {
    // Contributions 50 + 50, distribution 20 (implied millions), reserve
    // 20%, no explicit cohorts: net inflow 80, reserve 16, allocation 64.
    let policy = FundPolicy {
        commitment: 0.0,
        target_reserve_pct: 0.2,
        starting_cash: 0.0,
        vintage_year: None,
    };
    let flows = vec![
        flow("2024-01-15", 50.0, FlowKind::Contribution),
        flow("2024-04-15", 50.0, FlowKind::Contribution),
        flow("2024-07-15", 20.0, FlowKind::Distribution),
    ];

    let result = calculate(&policy, &Constraints::default(), &flows, &[]).unwrap();

    assert_eq!(result.reserve_balance_cents, 1_600_000_000);
    assert_eq!(result.cumulative_deployed_cents, 6_400_000_000);
    assert_eq!(result.remaining_capacity_cents, 1_600_000_000);
    assert_eq!(result.allocations_by_cohort.len(), 1);
    assert_eq!(result.allocations_by_cohort[0].cohort_id, "auto:vintage:2024");
    assert_eq!(result.allocations_by_cohort[0].amount_cents, 6_400_000_000);
    assert!(result.violations.is_empty());
}

#[test]
fn conservation_identities_hold_for_the_reserve_scenario() {
    let policy = FundPolicy {
        commitment: 0.0,
        target_reserve_pct: 0.2,
        starting_cash: 0.0,
        vintage_year: None,
    };
    let flows = vec![
        flow("2024-01-15", 50.0, FlowKind::Contribution),
        flow("2024-04-15", 50.0, FlowKind::Contribution),
        flow("2024-07-15", 20.0, FlowKind::Distribution),
    ];
    let result = calculate(&policy, &Constraints::default(), &flows, &[]).unwrap();

    // Cash: starting + contributions - distributions - deployed == reserve.
    let deployed: i64 = result
        .allocations_by_cohort
        .iter()
        .map(|a| a.amount_cents)
        .sum();
    assert_eq!(
        10_000_000_000 - 2_000_000_000 - deployed,
        result.reserve_balance_cents
    );
    // Capacity: commitment == allocations + remaining capacity.
    assert_eq!(
        8_000_000_000,
        deployed + result.remaining_capacity_cents
    );
}

#[test]
fn mismatched_units_fail_rather_than_guess() {
    // Commitment in implied millions next to a buffer in raw units.
    let policy = FundPolicy {
        commitment: 100.0,
        target_reserve_pct: 0.1,
        starting_cash: 0.0,
        vintage_year: None,
    };
    let constraints = Constraints {
        min_cash_buffer: Some(1_000_000.0),
        max_allocation_per_cohort: None,
    };
    let err = calculate(&policy, &constraints, &[], &[]).unwrap_err();
    assert!(matches!(err, EngineError::UnitMismatch { .. }));
}

#[test]
fn three_way_largest_remainder_over_a_million_cents() {
    let policy = FundPolicy {
        commitment: 1_000_000.0,
        target_reserve_pct: 0.0,
        starting_cash: 10_000.0,
        vintage_year: None,
    };
    let cohorts = vec![
        cohort("a", "2024-01-01", 0.3333333, None),
        cohort("b", "2024-01-01", 0.3333333, None),
        cohort("c", "2024-01-01", 0.3333334, None),
    ];
    let result = calculate(&policy, &Constraints::default(), &[], &cohorts).unwrap();

    let amounts: Vec<i64> = result
        .allocations_by_cohort
        .iter()
        .map(|a| a.amount_cents)
        .collect();
    assert_eq!(amounts, vec![333_333, 333_333, 333_334]);
    assert_eq!(amounts.iter().sum::<i64>(), 1_000_000);
    assert!(result.violations.is_empty());
}

#[test]
fn cap_exhaustion_is_not_a_violation() {
    let policy = FundPolicy {
        commitment: 10_000_000.0,
        target_reserve_pct: 0.0,
        starting_cash: 1_000_000.0,
        vintage_year: None,
    };
    let cohorts = vec![
        cohort("a", "2023-01-01", 0.5, Some(200_000.0)),
        cohort("b", "2024-01-01", 0.5, Some(300_000.0)),
    ];
    let result = calculate(&policy, &Constraints::default(), &[], &cohorts).unwrap();

    assert!(result.violations.is_empty());
    assert!(result.remaining_capacity_cents > 0);
    let amounts: Vec<i64> = result
        .allocations_by_cohort
        .iter()
        .map(|a| a.amount_cents)
        .collect();
    // Both cohorts pinned at their caps; the rest stays in reserve.
    assert_eq!(amounts, vec![20_000_000, 30_000_000]);
    assert_eq!(result.reserve_balance_cents, 50_000_000);
}

#[test]
fn unsatisfiable_buffer_surfaces_one_warning() {
    let policy = FundPolicy {
        commitment: 1_000_000.0,
        target_reserve_pct: 0.5,
        starting_cash: 100_000.0,
        vintage_year: None,
    };
    let result = calculate(&policy, &Constraints::default(), &[], &[]).unwrap();

    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].kind, ViolationKind::BufferBreach);
    // Nothing allocable: all cash is held back.
    assert_eq!(result.cumulative_deployed_cents, 0);
    assert_eq!(result.reserve_balance_cents, 10_000_000);
}

#[test]
fn empty_request_produces_an_empty_but_complete_result() {
    let policy = FundPolicy {
        commitment: 0.0,
        target_reserve_pct: 0.0,
        starting_cash: 0.0,
        vintage_year: None,
    };
    let result = calculate(&policy, &Constraints::default(), &[], &[]).unwrap();

    assert_eq!(result.reserve_balance_cents, 0);
    assert_eq!(result.remaining_capacity_cents, 0);
    assert_eq!(result.allocations_by_cohort.len(), 1);
    assert_eq!(result.allocations_by_cohort[0].amount_cents, 0);
    assert_eq!(
        result.allocations_by_cohort[0].cohort_id,
        "auto:vintage:unspecified"
    );
    assert!(result.violations.is_empty());
}

#[test]
fn ten_runs_yield_byte_identical_output() {
    let policy = FundPolicy {
        commitment: 250.0,
        target_reserve_pct: 0.15,
        starting_cash: 10.0,
        vintage_year: Some(2023),
    };
    let constraints = Constraints {
        min_cash_buffer: Some(5.0),
        max_allocation_per_cohort: Some(40.0),
    };
    let flows = vec![
        flow("2023-03-01", 60.0, FlowKind::Contribution),
        flow("2023-09-01", 45.0, FlowKind::Contribution),
        flow("2024-02-01", 25.0, FlowKind::Distribution),
        flow("2024-02-01", 15.0, FlowKind::Contribution),
    ];
    let cohorts = vec![
        cohort("growth", "2023-01-01", 0.45, Some(55.0)),
        cohort("income", "2023-06-01", 0.35, None),
        cohort("special-situations", "2024-01-01", 0.20, Some(12.5)),
    ];

    let first = calculate(&policy, &constraints, &flows, &cohorts).unwrap();
    let first_bytes = serde_json::to_string(&first).unwrap();
    for _ in 0..9 {
        let next = calculate(&policy, &constraints, &flows, &cohorts).unwrap();
        assert_eq!(serde_json::to_string(&next).unwrap(), first_bytes);
        assert_eq!(next.digest, first.digest);
    }
}
