//! Fixed-point converter and unit-mismatch detector.
//!
//! Callers send monetary fields as raw decimals in an unknown but
//! internally consistent scale: raw currency units, or millions of them.
//! This stage infers one scale factor for the whole request, rejects
//! requests whose fields cannot plausibly share a scale, and converts
//! every field to integer cents with banker's rounding.

use chrono::NaiveDate;
use nidhi_models::{CashFlow, Cents, CohortSpec, Constraints, EngineError, FlowKind, FundPolicy};
use tracing::debug;

use crate::rounding::round_half_even_f64;

/// Parts-per-ten-million scale shared by reserve percentages and cohort
/// weights.
pub(crate) const FRACTION_SCALE: i64 = 10_000_000;

/// Spread between the largest and smallest non-zero monetary field beyond
/// which the request is inconsistently scaled. The mismatch test vector
/// (commitment 100 vs. buffer 1,000,000) sits exactly at this limit.
const UNIT_RATIO_SPREAD_MAX: f64 = 10_000.0;

/// Commitments below this magnitude are assumed to be expressed in
/// millions of currency units.
const MILLIONS_THRESHOLD: f64 = 100_000.0;

const MILLIONS_FACTOR: f64 = 1_000_000.0;

/// A cash flow after conversion to cents, in canonical processing order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedFlow {
    pub date: NaiveDate,
    pub amount_cents: Cents,
    pub kind: FlowKind,
}

/// Every monetary input converted to cents, plus the reserve fraction on
/// the integer scale.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedInputs {
    pub commitment_cents: Cents,
    pub starting_cash_cents: Cents,
    pub min_buffer_cents: Cents,
    /// Default per-cohort cap from `Constraints`.
    pub default_cap_cents: Option<Cents>,
    /// Target reserve percentage in parts per ten million.
    pub reserve_ppm: i64,
    /// Flows sorted by (date, kind): contributions before distributions
    /// within a day.
    pub flows: Vec<NormalizedFlow>,
    /// Per-cohort caps, parallel to the caller's cohort list.
    pub cohort_caps: Vec<Option<Cents>>,
}

pub(crate) fn normalize(
    policy: &FundPolicy,
    constraints: &Constraints,
    cash_flows: &[CashFlow],
    cohorts: &[CohortSpec],
) -> Result<NormalizedInputs, EngineError> {
    let fields = collect_fields(policy, constraints, cash_flows, cohorts)?;
    check_scale_consistency(&fields)?;

    let scale = infer_scale(policy.commitment, &fields);
    debug!(scale, field_count = fields.len(), "inferred unit scale");

    let reserve_ppm = fraction_ppm("target_reserve_pct", policy.target_reserve_pct)?;

    let commitment_cents = to_cents("commitment", policy.commitment, scale)?;
    let starting_cash_cents = to_cents("starting_cash", policy.starting_cash, scale)?;
    let min_buffer_cents = match constraints.min_cash_buffer {
        Some(buffer) => to_cents("min_cash_buffer", buffer, scale)?,
        None => 0,
    };
    let default_cap_cents = constraints
        .max_allocation_per_cohort
        .map(|cap| to_cents("max_allocation_per_cohort", cap, scale))
        .transpose()?;

    let mut flows: Vec<NormalizedFlow> = cash_flows
        .iter()
        .enumerate()
        .map(|(i, flow)| {
            let field = format!("cash_flows[{i}].amount");
            Ok(NormalizedFlow {
                date: flow.date,
                amount_cents: to_cents(&field, flow.amount, scale)?,
                kind: flow.kind,
            })
        })
        .collect::<Result<_, EngineError>>()?;
    // Canonical within-date order; period-end balances do not depend on it.
    flows.sort_by(|a, b| (a.date, a.kind).cmp(&(b.date, b.kind)));

    let cohort_caps = cohorts
        .iter()
        .map(|cohort| {
            cohort
                .cap
                .map(|cap| to_cents(&format!("cohorts[{}].cap", cohort.id), cap, scale))
                .transpose()
        })
        .collect::<Result<_, EngineError>>()?;

    Ok(NormalizedInputs {
        commitment_cents,
        starting_cash_cents,
        min_buffer_cents,
        default_cap_cents,
        reserve_ppm,
        flows,
        cohort_caps,
    })
}

/// Gather every monetary field with its path for error reporting, and
/// reject non-finite values and negative amounts that the data model
/// declares non-negative.
fn collect_fields(
    policy: &FundPolicy,
    constraints: &Constraints,
    cash_flows: &[CashFlow],
    cohorts: &[CohortSpec],
) -> Result<Vec<(String, f64)>, EngineError> {
    let mut fields = Vec::with_capacity(4 + cash_flows.len() + cohorts.len());

    let mut push = |name: String, value: f64, non_negative: bool| -> Result<(), EngineError> {
        if !value.is_finite() || (non_negative && value < 0.0) {
            return Err(EngineError::InvalidAmount { field: name, value });
        }
        fields.push((name, value));
        Ok(())
    };

    push("commitment".to_string(), policy.commitment, true)?;
    push("starting_cash".to_string(), policy.starting_cash, false)?;
    if let Some(buffer) = constraints.min_cash_buffer {
        push("min_cash_buffer".to_string(), buffer, true)?;
    }
    if let Some(cap) = constraints.max_allocation_per_cohort {
        push("max_allocation_per_cohort".to_string(), cap, true)?;
    }
    for (i, flow) in cash_flows.iter().enumerate() {
        push(format!("cash_flows[{i}].amount"), flow.amount, false)?;
    }
    for cohort in cohorts {
        if let Some(cap) = cohort.cap {
            push(format!("cohorts[{}].cap", cohort.id), cap, true)?;
        }
    }

    Ok(fields)
}

/// Reject requests whose non-zero monetary fields span more than the
/// allowed magnitude spread. Silent auto-correction of a unit error can
/// corrupt financial totals undetectably, so this fails instead of
/// guessing. Needs at least two non-zero fields to say anything.
fn check_scale_consistency(fields: &[(String, f64)]) -> Result<(), EngineError> {
    let mut min: Option<(&str, f64)> = None;
    let mut max: Option<(&str, f64)> = None;
    for (name, value) in fields {
        let magnitude = value.abs();
        if magnitude == 0.0 {
            continue;
        }
        if min.is_none_or(|(_, m)| magnitude < m) {
            min = Some((name, magnitude));
        }
        if max.is_none_or(|(_, m)| magnitude > m) {
            max = Some((name, magnitude));
        }
    }

    if let (Some((min_field, min_mag)), Some((max_field, max_mag))) = (min, max) {
        if min_field != max_field {
            let ratio = max_mag / min_mag;
            if ratio >= UNIT_RATIO_SPREAD_MAX {
                return Err(EngineError::UnitMismatch {
                    min_field: min_field.to_string(),
                    max_field: max_field.to_string(),
                    ratio,
                    limit: UNIT_RATIO_SPREAD_MAX,
                });
            }
        }
    }
    Ok(())
}

/// One scale factor for the whole request, inferred from the commitment
/// magnitude; a zero commitment falls back to the largest non-zero field.
fn infer_scale(commitment: f64, fields: &[(String, f64)]) -> f64 {
    let reference = if commitment != 0.0 {
        commitment.abs()
    } else {
        fields
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max)
    };
    if reference != 0.0 && reference < MILLIONS_THRESHOLD {
        MILLIONS_FACTOR
    } else {
        1.0
    }
}

fn to_cents(field: &str, value: f64, scale: f64) -> Result<Cents, EngineError> {
    round_half_even_f64(value * scale * 100.0).ok_or_else(|| EngineError::InvalidAmount {
        field: field.to_string(),
        value,
    })
}

/// Convert a fraction in [0, 1] to parts per ten million.
fn fraction_ppm(field: &str, value: f64) -> Result<i64, EngineError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EngineError::InvalidAmount {
            field: field.to_string(),
            value,
        });
    }
    // In range by the check above.
    Ok((value * FRACTION_SCALE as f64).round_ties_even() as i64)
}
