use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};

use cambio_core::db;
use cambio_core::ledger::LedgerService;
use cambio_core::locations::LocationService;
use cambio_core::reconciliation::ReconciliationService;

#[derive(Parser, Debug)]
#[command(name = "cambio")]
#[command(about = "Operational tooling for the cambio branch ledger")]
struct Cli {
    /// Directory holding the database file (`DATABASE_URL` overrides the
    /// resolved path entirely).
    #[arg(long, env = "CAMBIO_DATA_DIR", default_value = ".")]
    data_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute balances from ledger history and report (or fix) drift
    Reconcile(ReconcileArgs),
    /// Repair movements whose stored sign contradicts their kind
    NormalizeSigns(NormalizeArgs),
}

#[derive(Args, Debug)]
struct ReconcileArgs {
    /// Restrict the run to one branch, by name
    #[arg(long)]
    location: Option<String>,

    /// Only reconcile pairs with activity on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only reconcile pairs with activity on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Write corrective adjustments instead of just reporting
    #[arg(long)]
    apply: bool,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// Restrict the pass to one branch, by name
    #[arg(long)]
    location: Option<String>,

    /// Only inspect movements on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only inspect movements on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Flip the misfiled signs instead of just counting them
    #[arg(long)]
    apply: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let db_path = db::init(&cli.data_dir).context("failed to initialize database")?;
    let pool = db::create_pool(&db_path).context("failed to create connection pool")?;
    db::run_migrations(&pool).context("failed to run migrations")?;

    match cli.command {
        Command::Reconcile(args) => reconcile(pool, args),
        Command::NormalizeSigns(args) => normalize_signs(pool, args),
    }
}

fn reconcile(pool: std::sync::Arc<db::DbPool>, args: ReconcileArgs) -> Result<()> {
    let location_id = match args.location.as_deref() {
        Some(name) => Some(resolve_location(&pool, name)?),
        None => None,
    };

    let from = args.from.map(start_of_day);
    let to = args.to.map(end_of_day);

    // Misfiled signs make drift figures meaningless, so check before running.
    let sign_check = LedgerService::new(pool.clone())
        .normalize_signs(location_id.as_deref(), from, to, false)
        .context("sign check failed")?;
    if sign_check.total_misfiled() > 0 {
        println!(
            "Warning: {} movements carry a misfiled sign; run normalize-signs --apply first.",
            sign_check.total_misfiled()
        );
    }

    let service = ReconciliationService::new(pool);
    let summary = service
        .reconcile_all(location_id.as_deref(), from, to, args.apply)
        .context("reconciliation run failed")?;

    println!(
        "Run {}: {} pairs checked, {} with drift, {} corrections applied, {} failed",
        summary.run_id,
        summary.pairs_checked,
        summary.pairs_with_drift,
        summary.corrections_applied,
        summary.pairs_failed
    );

    for report in summary.reports.iter().filter(|r| r.has_drift()) {
        println!(
            "  ({}, {}): stored {} vs recomputed {} (drift {}){}",
            report.location_id,
            report.currency_id,
            report.stored,
            report.recomputed,
            report.drift,
            if report.corrected { " [corrected]" } else { "" }
        );
    }

    if !summary.applied && summary.pairs_with_drift > 0 {
        println!("Re-run with --apply to write corrective adjustments.");
    }

    // Drift is a report, not a failure. Only storage errors exit non-zero.
    if summary.pairs_failed > 0 {
        anyhow::bail!("{} pairs failed to reconcile", summary.pairs_failed);
    }

    Ok(())
}

fn normalize_signs(pool: std::sync::Arc<db::DbPool>, args: NormalizeArgs) -> Result<()> {
    let location_id = match args.location.as_deref() {
        Some(name) => Some(resolve_location(&pool, name)?),
        None => None,
    };

    let service = LedgerService::new(pool);
    let report = service
        .normalize_signs(
            location_id.as_deref(),
            args.from.map(start_of_day),
            args.to.map(end_of_day),
            args.apply,
        )
        .context("sign normalization failed")?;

    println!(
        "Scanned {} movements: {} misfiled EGRESO, {} misfiled INGRESO{}",
        report.scanned,
        report.misfiled_egresos,
        report.misfiled_ingresos,
        if report.applied { " (repaired)" } else { "" }
    );

    if !report.applied && report.total_misfiled() > 0 {
        println!("Re-run with --apply to flip the misfiled signs.");
    }

    Ok(())
}

fn resolve_location(pool: &std::sync::Arc<db::DbPool>, name: &str) -> Result<String> {
    let service = LocationService::new(pool.clone());
    let location = service
        .get_location_by_name(name)
        .with_context(|| format!("unknown location '{name}'"))?;
    Ok(location.id)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

/// Inclusive upper bound: the stored filters use `<=`, so the bound must be
/// the last representable instant of the named day.
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_bounds_span_the_whole_named_day() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert_eq!(start_of_day(day), day.and_hms_opt(0, 0, 0).unwrap());

        // A movement late on the named day still falls within the bound.
        let late = day.and_hms_nano_opt(23, 59, 59, 500_000_000).unwrap();
        assert!(late <= end_of_day(day));

        // The next day's midnight does not.
        let next_midnight = day.succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(next_midnight > end_of_day(day));
    }
}
