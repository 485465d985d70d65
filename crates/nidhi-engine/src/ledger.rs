//! Cash ledger and effective-buffer calculator.
//!
//! Settles the period's flows into a gross cash position, derives the
//! effective reserve buffer, and sizes the pool available for cohort
//! allocation. Buffer enforcement clips allocations downward first; a
//! warning is recorded only when the buffer cannot be satisfied even at
//! zero allocation.

use nidhi_models::{Cents, EngineError, FlowKind, Violation, ViolationKind};
use tracing::{debug, warn};

use crate::rounding::div_round_half_even;
use crate::units::{NormalizedInputs, FRACTION_SCALE};

/// Period-end cash position and the allocation pool derived from it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LedgerSummary {
    /// Cash on hand before any allocation leaves the fund.
    pub gross_cash_cents: Cents,
    /// Stated commitment, or net contributed capital when none was stated.
    pub effective_commitment_cents: Cents,
    /// max(min cash buffer, commitment x target reserve pct).
    pub effective_buffer_cents: Cents,
    /// Held-back cash target: min(gross cash, effective buffer).
    pub reserve_target_cents: Cents,
    /// Pool available to the allocator, clipped to commitment capacity.
    pub allocable_cents: Cents,
    /// Advisory findings raised while settling.
    pub warnings: Vec<Violation>,
}

pub(crate) fn settle(normalized: &NormalizedInputs) -> Result<LedgerSummary, EngineError> {
    let mut contributions = 0_i128;
    let mut distributions = 0_i128;
    for flow in &normalized.flows {
        match flow.kind {
            FlowKind::Contribution => contributions += i128::from(flow.amount_cents),
            FlowKind::Distribution => distributions += i128::from(flow.amount_cents),
        }
    }

    let gross = i128::from(normalized.starting_cash_cents) + contributions - distributions;
    let gross_cash_cents = narrow(gross, "gross_cash")?;
    if gross_cash_cents < 0 {
        return Err(EngineError::NegativeBalance {
            ending_cash_cents: gross_cash_cents,
        });
    }

    let effective_commitment_cents = if normalized.commitment_cents > 0 {
        normalized.commitment_cents
    } else {
        narrow((contributions - distributions).max(0), "net_contributions")?
    };

    let reserve_term = div_round_half_even(
        i128::from(effective_commitment_cents) * i128::from(normalized.reserve_ppm),
        i128::from(FRACTION_SCALE),
    );
    let effective_buffer_cents = normalized.min_buffer_cents.max(narrow(reserve_term, "reserve")?);

    let reserve_target_cents = gross_cash_cents.min(effective_buffer_cents);

    let mut warnings = Vec::new();
    if gross_cash_cents < effective_buffer_cents {
        let shortfall = effective_buffer_cents - gross_cash_cents;
        warn!(shortfall, "effective buffer unsatisfiable even at zero allocation");
        warnings.push(Violation::warning(
            ViolationKind::BufferBreach,
            format!(
                "effective buffer of {effective_buffer_cents} cents exceeds available cash \
                 of {gross_cash_cents} cents by {shortfall} cents even at zero allocation"
            ),
        ));
    }

    let allocable_cash = gross_cash_cents - reserve_target_cents;
    let allocable_cents = allocable_cash.min(effective_commitment_cents);
    if allocable_cash > effective_commitment_cents {
        let clipped = allocable_cash - effective_commitment_cents;
        warn!(clipped, "allocable cash exceeds commitment capacity; clipping");
        warnings.push(Violation::warning(
            ViolationKind::OverAllocation,
            format!(
                "allocable cash of {allocable_cash} cents exceeds remaining commitment \
                 capacity of {effective_commitment_cents} cents; clipped {clipped} cents"
            ),
        ));
    }

    debug!(
        gross_cash_cents,
        effective_buffer_cents, reserve_target_cents, allocable_cents, "ledger settled"
    );

    Ok(LedgerSummary {
        gross_cash_cents,
        effective_commitment_cents,
        effective_buffer_cents,
        reserve_target_cents,
        allocable_cents,
        warnings,
    })
}

fn narrow(value: i128, field: &str) -> Result<Cents, EngineError> {
    Cents::try_from(value).map_err(|_| EngineError::InvalidAmount {
        field: field.to_string(),
        value: value as f64,
    })
}
