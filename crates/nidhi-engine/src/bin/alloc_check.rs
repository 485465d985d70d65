//! alloc-check CLI - one-shot capital allocation runner.
//!
//! ## Usage
//!
//! ```bash
//! # Human-readable summary
//! alloc-check --request request.json
//!
//! # Full result as JSON (stable across runs for identical input)
//! alloc-check --request request.json --format json
//! ```
//!
//! ## Exit Codes
//! - 0: Calculation succeeded with no violations
//! - 1: Calculation succeeded but the result carries warnings
//! - 2: Engine error or I/O failure

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use nidhi_engine::calculate_request;
use nidhi_models::{CalculationRequest, CalculationResult};

/// alloc-check: run one capital allocation calculation from a JSON request.
#[derive(Parser)]
#[command(name = "alloc-check")]
#[command(version = "0.1.0")]
#[command(about = "Deterministic capital allocation runner")]
struct Cli {
    /// Path to a CalculationRequest JSON file
    #[arg(long, short = 'r')]
    request: PathBuf,

    /// Output format: text (default) or json
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(result) => {
            if result.violations.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<CalculationResult> {
    let raw = fs::read_to_string(&cli.request)
        .with_context(|| format!("reading {}", cli.request.display()))?;
    let request: CalculationRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", cli.request.display()))?;

    let result = calculate_request(&request)
        .with_context(|| "calculation failed")?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => print_text(&result),
    }
    Ok(result)
}

fn print_text(result: &CalculationResult) {
    println!("reserve balance:    {} cents", result.reserve_balance_cents);
    println!(
        "remaining capacity: {} cents",
        result.remaining_capacity_cents
    );
    println!(
        "deployed:           {} cents",
        result.cumulative_deployed_cents
    );
    println!("digest:             {}", result.digest);
    println!("allocations:");
    for alloc in &result.allocations_by_cohort {
        println!(
            "  {:<24} {:>16} cents  ({})",
            alloc.cohort_id,
            alloc.amount_cents,
            alloc.kind.as_str()
        );
    }
    if result.violations.is_empty() {
        println!("violations:         none");
    } else {
        println!("violations:");
        for violation in &result.violations {
            let scope = violation
                .cohort_id
                .as_deref()
                .map(|id| format!(" [{id}]"))
                .unwrap_or_default();
            println!(
                "  {} ({}){}: {}",
                violation.kind.as_str(),
                violation.severity.as_str(),
                scope,
                violation.message
            );
        }
    }
}
