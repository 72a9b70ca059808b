use chrono::NaiveDateTime;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::{error, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::recompute::recompute_pair;
use super::reconciliation_model::{PairReport, ReconciliationSummary};
use super::{ReconciliationError, Result};
use crate::balances::{BalanceRepository, InitialBalanceRepository};
use crate::constants::SOURCE_KIND_RECONCILIATION;
use crate::db::get_connection;
use crate::ledger::ledger_model::balance_tolerance;
use crate::ledger::{post_movement, LedgerRepository, MovementKind, PostMovementInput, SettlementChannel};

/// Recomputes balances from first principles and heals drift.
///
/// Each pair runs in its own transaction so a failure partway through a
/// batch does not undo earlier corrections.
pub struct ReconciliationService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl ReconciliationService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Reconciles a single (location, currency) pair. With `apply == false`
    /// the drift is reported but not corrected.
    pub fn reconcile_pair(
        &self,
        location_id: &str,
        currency_id: &str,
        apply: bool,
    ) -> Result<PairReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        self.reconcile_pair_in_run(location_id, currency_id, apply, &run_id, "reconciler")
    }

    fn reconcile_pair_in_run(
        &self,
        location_id: &str,
        currency_id: &str,
        apply: bool,
        run_id: &str,
        acting_user: &str,
    ) -> Result<PairReport> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ReconciliationError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let initial =
                InitialBalanceRepository::get_active(tx_conn, location_id, currency_id)?
                    .map(|ib| ib.amount)
                    .unwrap_or(Decimal::ZERO);

            let movements =
                LedgerRepository::query_pair(tx_conn, location_id, currency_id, None, None)?;
            let recomputed = recompute_pair(initial, &movements);

            let stored = BalanceRepository::get_pair(tx_conn, location_id, currency_id)?
                .map(|b| b.amount)
                .unwrap_or(Decimal::ZERO);

            let drift = recomputed.recomputed - stored;
            let mut corrected = false;

            if drift.abs() > balance_tolerance() {
                warn!(
                    "Drift on pair ({}, {}): stored {} vs recomputed {} (delta {})",
                    location_id, currency_id, stored, recomputed.recomputed, drift
                );

                if apply {
                    post_movement(
                        tx_conn,
                        PostMovementInput {
                            location_id,
                            currency_id,
                            kind: MovementKind::Ajuste,
                            amount: drift,
                            channel: SettlementChannel::Cash,
                            user_id: acting_user,
                            source_kind: SOURCE_KIND_RECONCILIATION,
                            source_id: Some(run_id),
                            description: Some(format!(
                                "Reconciliation correction: stored {} vs recomputed {}",
                                stored, recomputed.recomputed
                            )),
                            allow_negative: true,
                        },
                    )?;
                    corrected = true;
                    info!(
                        "Corrected pair ({}, {}) by {} (run {})",
                        location_id, currency_id, drift, run_id
                    );
                }
            }

            Ok(PairReport {
                location_id: location_id.to_string(),
                currency_id: currency_id.to_string(),
                initial: recomputed.initial,
                total_ingresos: recomputed.total_ingresos,
                total_egresos: recomputed.total_egresos,
                total_ajustes: recomputed.total_ajustes,
                recomputed: recomputed.recomputed,
                stored,
                drift,
                corrected,
            })
        })
    }

    /// Reconciles every known pair, one transaction per pair. A pair is
    /// "known" if it has ledger history, a materialized row, or an initial
    /// balance. `location_filter` restricts the batch to one branch;
    /// `from`/`to` restrict it to pairs with ledger activity in the range
    /// (recomputation itself always uses the full history).
    pub fn reconcile_all(
        &self,
        location_filter: Option<&str>,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
        apply: bool,
    ) -> Result<ReconciliationSummary> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let pairs = self.collect_pairs(location_filter, from, to)?;
        info!(
            "Reconciliation run {} over {} pairs (apply: {})",
            run_id,
            pairs.len(),
            apply
        );

        let mut reports = Vec::with_capacity(pairs.len());
        let mut pairs_failed = 0usize;

        for (location_id, currency_id) in &pairs {
            match self.reconcile_pair_in_run(location_id, currency_id, apply, &run_id, "reconciler")
            {
                Ok(report) => reports.push(report),
                Err(e) => {
                    // One broken pair must not stop the batch.
                    error!(
                        "Reconciliation failed for pair ({}, {}): {}",
                        location_id, currency_id, e
                    );
                    pairs_failed += 1;
                }
            }
        }

        let pairs_with_drift = reports.iter().filter(|r| r.has_drift()).count();
        let corrections_applied = reports.iter().filter(|r| r.corrected).count();

        Ok(ReconciliationSummary {
            run_id,
            pairs_checked: reports.len(),
            pairs_with_drift,
            corrections_applied,
            pairs_failed,
            applied: apply,
            reports,
        })
    }

    fn collect_pairs(
        &self,
        location_filter: Option<&str>,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Vec<(String, String)>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ReconciliationError::DatabaseError(e.to_string()))?;

        let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
        pairs.extend(LedgerRepository::distinct_pairs(&mut conn)?);
        pairs.extend(BalanceRepository::distinct_pairs(&mut conn)?);
        pairs.extend(InitialBalanceRepository::distinct_pairs(&mut conn)?);

        let mut selected: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(loc, _)| location_filter.map(|f| f == loc).unwrap_or(true))
            .collect();

        // A date range narrows the batch to pairs with activity inside it.
        if from.is_some() || to.is_some() {
            let mut active: Vec<(String, String)> = Vec::new();
            for (loc, cur) in selected {
                let in_range = LedgerRepository::query_pair(&mut conn, &loc, &cur, from, to)?;
                if !in_range.is_empty() {
                    active.push((loc, cur));
                }
            }
            selected = active;
        }

        Ok(selected)
    }
}
