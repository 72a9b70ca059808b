use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::debug;
use std::sync::Arc;

use super::ledger_model::{Movement, MovementKind, MovementQuery, NewAdjustment};
use super::ledger_repository::LedgerRepository;
use super::normalizer::{self, NormalizationReport};
use super::posting::{post_movement, PostMovementInput};
use super::{LedgerError, Result};
use crate::constants::SOURCE_KIND_MANUAL_ADJUSTMENT;
use crate::db::get_connection;

/// Service over the movement ledger: queries, manual adjustments and the
/// sign-normalization repair pass.
pub struct LedgerService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    repository: LedgerRepository,
}

impl LedgerService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        let repository = LedgerRepository::new(pool.clone());
        Self { pool, repository }
    }

    pub fn get_movements(&self, filter: &MovementQuery) -> Result<Vec<Movement>> {
        self.repository.get_movements(filter)
    }

    pub fn get_movements_by_source(
        &self,
        source_kind: &str,
        source_id: &str,
    ) -> Result<Vec<Movement>> {
        self.repository.get_movements_by_source(source_kind, source_id)
    }

    /// Posts a manual AJUSTE. The signed amount is taken at face value and
    /// may drive the balance negative (that is what corrections are for).
    pub fn record_adjustment(&self, adjustment: NewAdjustment) -> Result<Movement> {
        adjustment.validate()?;
        debug!(
            "Recording manual adjustment of {} for pair ({}, {})",
            adjustment.amount, adjustment.location_id, adjustment.currency_id
        );

        let mut conn = get_connection(&self.pool)
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            post_movement(
                tx_conn,
                PostMovementInput {
                    location_id: &adjustment.location_id,
                    currency_id: &adjustment.currency_id,
                    kind: MovementKind::Ajuste,
                    amount: adjustment.amount,
                    channel: adjustment.channel,
                    user_id: &adjustment.user_id,
                    source_kind: SOURCE_KIND_MANUAL_ADJUSTMENT,
                    source_id: None,
                    description: adjustment.description.clone(),
                    allow_negative: true,
                },
            )
        })
    }

    /// Runs (or previews, with `apply == false`) the sign-normalization
    /// repair pass in a single transaction.
    pub fn normalize_signs(
        &self,
        location_filter: Option<&str>,
        from: Option<chrono::NaiveDateTime>,
        to: Option<chrono::NaiveDateTime>,
        apply: bool,
    ) -> Result<NormalizationReport> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            normalizer::normalize_signs(tx_conn, location_filter, from, to, apply)
        })
    }
}
