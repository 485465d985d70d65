//! Dated cash flows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a cash flow relative to the fund.
///
/// The derived ordering (contributions before distributions) is the
/// canonical within-date processing order. It affects presentation only;
/// period-end balances are order-independent because constraints are
/// evaluated at period end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Capital called in from limited partners.
    Contribution,
    /// Capital returned to limited partners.
    Distribution,
}

/// A single dated cash movement.
///
/// `date` is a UTC calendar day-bucket with no time-of-day; a flow dated
/// exactly on a period-end date belongs to the ending period (inclusive
/// boundaries). Serde accepts only canonical `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Calendar day of the movement.
    pub date: NaiveDate,
    /// Raw decimal amount in the fund's (inferred) scale.
    pub amount: f64,
    /// Contribution or distribution.
    pub kind: FlowKind,
}
