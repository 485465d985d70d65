//! Cohort resolver and canonical sorter.
//!
//! Turns zero or more caller-supplied cohorts into a non-empty,
//! weight-normalized, uniquely-identified, canonically-ordered list. All
//! ordering is byte-wise; locale collation is non-deterministic across
//! environments and never used.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use nidhi_models::{Cents, CohortSpec, EngineError, FundPolicy};
use tracing::debug;

use crate::units::{NormalizedInputs, FRACTION_SCALE};

/// Id prefix for the synthesized vintage cohort, so it cannot collide with
/// any caller-supplied id.
const SYNTHETIC_ID_PREFIX: &str = "auto:vintage:";

/// Tolerance for the cohort weight sum, as a fraction of 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// A cohort ready for allocation: canonical position fixed, weight on the
/// integer fraction scale, cap in cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedCohort {
    pub id: String,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    /// Weight in parts per ten million. Sums to exactly `FRACTION_SCALE`
    /// across the resolved list.
    pub weight_ppm: i64,
    /// Tighter of the cohort's own cap and the default per-cohort cap.
    pub cap_cents: Option<Cents>,
}

/// Canonical cohort order: ascending (start_date, id), missing start date
/// last.
pub(crate) fn canonical_cmp(
    a: (Option<NaiveDate>, &str),
    b: (Option<NaiveDate>, &str),
) -> Ordering {
    let date_key = |d: Option<NaiveDate>| (d.is_none(), d);
    date_key(a.0).cmp(&date_key(b.0)).then_with(|| a.1.cmp(b.1))
}

pub(crate) fn resolve(
    cohorts: &[CohortSpec],
    policy: &FundPolicy,
    normalized: &NormalizedInputs,
) -> Result<Vec<ResolvedCohort>, EngineError> {
    if cohorts.is_empty() {
        return Ok(vec![synthesize(policy, normalized)]);
    }

    let mut seen = BTreeSet::new();
    for cohort in cohorts {
        if !seen.insert(cohort.id.as_str()) {
            return Err(EngineError::DuplicateCohort {
                cohort_id: cohort.id.clone(),
            });
        }
    }

    let mut sum = 0.0_f64;
    for cohort in cohorts {
        if !cohort.weight.is_finite() || cohort.weight <= 0.0 {
            return Err(EngineError::InvalidWeight {
                cohort_id: cohort.id.clone(),
                weight: cohort.weight,
            });
        }
        sum += cohort.weight;
    }
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        // Normalizing a large deviation would hide a caller bug.
        return Err(EngineError::WeightSumError {
            sum,
            tolerance: WEIGHT_SUM_TOLERANCE,
        });
    }

    let mut ordered: Vec<(&CohortSpec, Option<Cents>)> = cohorts
        .iter()
        .zip(normalized.cohort_caps.iter().copied())
        .collect();
    ordered.sort_by(|(a, _), (b, _)| {
        canonical_cmp((a.start_date, a.id.as_str()), (b.start_date, b.id.as_str()))
    });

    // Convert normalized weights to integer parts-per-ten-million. The
    // last cohort absorbs the conversion residual, so the sum is exactly
    // FRACTION_SCALE by construction.
    let mut resolved = Vec::with_capacity(ordered.len());
    let mut assigned_ppm = 0_i64;
    for (position, (cohort, cap)) in ordered.iter().enumerate() {
        let weight_ppm = if position + 1 == ordered.len() {
            FRACTION_SCALE - assigned_ppm
        } else {
            let ppm = ((cohort.weight / sum) * FRACTION_SCALE as f64).round_ties_even() as i64;
            assigned_ppm += ppm;
            ppm
        };
        resolved.push(ResolvedCohort {
            id: cohort.id.clone(),
            name: cohort.name.clone(),
            start_date: cohort.start_date,
            weight_ppm,
            cap_cents: tighter_cap(*cap, normalized.default_cap_cents),
        });
    }

    debug!(cohorts = resolved.len(), "resolved cohort list");
    Ok(resolved)
}

/// One implicit cohort covering the whole fund, keyed by vintage year:
/// the policy's explicit year, else the year of the earliest cash flow,
/// else a fixed sentinel (the engine reads no clock).
fn synthesize(policy: &FundPolicy, normalized: &NormalizedInputs) -> ResolvedCohort {
    let earliest = normalized.flows.iter().map(|f| f.date).min();
    let label = policy
        .vintage_year
        .or_else(|| earliest.map(|d| d.year()))
        .map(|year| year.to_string())
        .unwrap_or_else(|| "unspecified".to_string());

    debug!(vintage = %label, "synthesized implicit cohort");
    ResolvedCohort {
        id: format!("{SYNTHETIC_ID_PREFIX}{label}"),
        name: format!("Vintage {label}"),
        start_date: earliest,
        weight_ppm: FRACTION_SCALE,
        cap_cents: normalized.default_cap_cents,
    }
}

/// Tightest cap wins; `None` means uncapped.
fn tighter_cap(a: Option<Cents>, b: Option<Cents>) -> Option<Cents> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (cap, None) | (None, cap) => cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nidhi_models::Constraints;

    fn spec(id: &str, start: Option<&str>, weight: f64) -> CohortSpec {
        CohortSpec {
            id: id.to_string(),
            name: id.to_uppercase(),
            start_date: start.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()),
            weight,
            cap: None,
        }
    }

    fn normalized_for(cohorts: &[CohortSpec]) -> NormalizedInputs {
        let policy = FundPolicy {
            commitment: 1_000_000.0,
            target_reserve_pct: 0.0,
            starting_cash: 0.0,
            vintage_year: None,
        };
        crate::units::normalize(&policy, &Constraints::default(), &[], cohorts).unwrap()
    }

    fn policy_with_vintage(vintage_year: Option<i32>) -> FundPolicy {
        FundPolicy {
            commitment: 1_000_000.0,
            target_reserve_pct: 0.0,
            starting_cash: 0.0,
            vintage_year,
        }
    }

    #[test]
    fn canonical_order_matches_sort_vectors() {
        let cohorts = vec![
            spec("Z", None, 0.25),
            spec("A", Some("2024-06-01"), 0.25),
            spec("B", Some("2024-01-01"), 0.25),
            spec("A", Some("2024-01-01"), 0.25),
        ];
        // Rename the duplicate "A" to keep ids unique while preserving the
        // sort-vector shape.
        let mut cohorts = cohorts;
        cohorts[1].id = "A2".to_string();
        let normalized = normalized_for(&cohorts);
        let resolved = resolve(&cohorts, &policy_with_vintage(None), &normalized).unwrap();
        let order: Vec<&str> = resolved.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "A2", "Z"]);
        assert!(resolved[3].start_date.is_none());
    }

    #[test]
    fn empty_input_synthesizes_vintage_cohort() {
        let normalized = normalized_for(&[]);
        let resolved = resolve(&[], &policy_with_vintage(Some(2024)), &normalized).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "auto:vintage:2024");
        assert_eq!(resolved[0].name, "Vintage 2024");
        assert_eq!(resolved[0].weight_ppm, FRACTION_SCALE);
    }

    #[test]
    fn synthesized_vintage_without_year_or_flows_uses_sentinel() {
        let normalized = normalized_for(&[]);
        let resolved = resolve(&[], &policy_with_vintage(None), &normalized).unwrap();
        assert_eq!(resolved[0].id, "auto:vintage:unspecified");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let cohorts = vec![
            spec("a", Some("2024-01-01"), 0.5),
            spec("a", Some("2024-02-01"), 0.5),
        ];
        let normalized = normalized_for(&cohorts);
        let err = resolve(&cohorts, &policy_with_vintage(None), &normalized).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateCohort { cohort_id } if cohort_id == "a"));
    }

    #[test]
    fn non_positive_weights_are_rejected() {
        for bad in [-0.25, 0.0] {
            let cohorts = vec![spec("a", None, bad), spec("b", None, 1.0 - bad)];
            let normalized = normalized_for(&cohorts);
            let err = resolve(&cohorts, &policy_with_vintage(None), &normalized).unwrap_err();
            assert!(matches!(err, EngineError::InvalidWeight { cohort_id, .. } if cohort_id == "a"));
        }
    }

    #[test]
    fn small_weight_drift_normalizes() {
        let cohorts = vec![spec("a", None, 0.5004), spec("b", None, 0.5001)];
        let normalized = normalized_for(&cohorts);
        let resolved = resolve(&cohorts, &policy_with_vintage(None), &normalized).unwrap();
        let total: i64 = resolved.iter().map(|c| c.weight_ppm).sum();
        assert_eq!(total, FRACTION_SCALE);
    }

    #[test]
    fn large_weight_deviation_fails_fast() {
        let cohorts = vec![spec("a", None, 0.6), spec("b", None, 0.6)];
        let normalized = normalized_for(&cohorts);
        let err = resolve(&cohorts, &policy_with_vintage(None), &normalized).unwrap_err();
        assert!(matches!(err, EngineError::WeightSumError { .. }));
    }

    #[test]
    fn last_cohort_absorbs_ppm_residual() {
        let cohorts = vec![
            spec("a", Some("2024-01-01"), 0.3333333),
            spec("b", Some("2024-02-01"), 0.3333333),
            spec("c", Some("2024-03-01"), 0.3333334),
        ];
        let normalized = normalized_for(&cohorts);
        let resolved = resolve(&cohorts, &policy_with_vintage(None), &normalized).unwrap();
        let ppm: Vec<i64> = resolved.iter().map(|c| c.weight_ppm).collect();
        assert_eq!(ppm.iter().sum::<i64>(), FRACTION_SCALE);
        assert_eq!(ppm, vec![3_333_333, 3_333_333, 3_333_334]);
    }

    #[test]
    fn tighter_cap_wins() {
        assert_eq!(tighter_cap(Some(100), Some(50)), Some(50));
        assert_eq!(tighter_cap(Some(100), None), Some(100));
        assert_eq!(tighter_cap(None, Some(50)), Some(50));
        assert_eq!(tighter_cap(None, None), None);
    }
}
