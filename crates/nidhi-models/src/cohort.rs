//! Caller-supplied cohort definitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A vintage-year or caller-defined bucket against which capacity is
/// planned and deployed.
///
/// Cohorts form a set keyed by `id`, unique within one calculation; a
/// duplicate id is a fatal error, never silently merged. Weights must be
/// positive and sum to 1.0 within a 0.1% tolerance (the resolver
/// normalizes small drift and rejects anything larger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSpec {
    /// Unique identifier. Compared byte-wise everywhere; never with
    /// locale-aware collation.
    pub id: String,

    /// Display name.
    pub name: String,

    /// First day of the cohort's investment window. A missing start date
    /// sorts after every dated cohort in the canonical order.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Share of allocable capacity, in (0, 1].
    pub weight: f64,

    /// Optional allocation cap, raw decimal in the fund's scale.
    #[serde(default)]
    pub cap: Option<f64>,
}
