use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::ledger_model::balance_tolerance;

/// Per-pair outcome of a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairReport {
    pub location_id: String,
    pub currency_id: String,
    pub initial: Decimal,
    pub total_ingresos: Decimal,
    pub total_egresos: Decimal,
    pub total_ajustes: Decimal,
    pub recomputed: Decimal,
    /// The materialized amount before any correction (0 if no row existed).
    pub stored: Decimal,
    /// `recomputed - stored`.
    pub drift: Decimal,
    /// Whether a corrective AJUSTE was written in this run.
    pub corrected: bool,
}

impl PairReport {
    /// Drift beyond the comparison tolerance. Sub-tolerance differences are
    /// treated as clean, matching what the correction pass would do.
    pub fn has_drift(&self) -> bool {
        self.drift.abs() > balance_tolerance()
    }
}

/// Outcome of a batch reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSummary {
    /// Identifier stamped as `source_id` on every correction of this run.
    pub run_id: String,
    pub reports: Vec<PairReport>,
    pub pairs_checked: usize,
    pub pairs_with_drift: usize,
    pub corrections_applied: usize,
    /// Pairs that failed with a storage error and were skipped; the rest of
    /// the batch still ran.
    pub pairs_failed: usize,
    pub applied: bool,
}
