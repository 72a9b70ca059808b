use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::info;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::balances_model::{Balance, CashPosition, InitialBalance, InitialBalanceDB, NewInitialBalance};
use super::balances_repository::BalanceRepository;
use super::initial_balances_repository::InitialBalanceRepository;
use super::{BalanceError, Result};
use crate::constants::SOURCE_KIND_INITIAL_BALANCE;
use crate::db::get_connection;
use crate::ledger::{post_movement, LedgerRepository, MovementKind, PostMovementInput, SettlementChannel};
use crate::reconciliation::recompute_pair;

/// Read-only balance surface for dashboards, exports and the end-of-day
/// cash count, plus the initial-balance assignment workflow. Nothing here
/// writes a balance amount directly; amounts only change through postings.
pub struct BalanceService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    repository: BalanceRepository,
    initial_repository: InitialBalanceRepository,
}

impl BalanceService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        let repository = BalanceRepository::new(pool.clone());
        let initial_repository = InitialBalanceRepository::new(pool.clone());
        Self {
            pool,
            repository,
            initial_repository,
        }
    }

    pub fn get_balance(&self, location_id: &str, currency_id: &str) -> Result<Balance> {
        self.repository.get_balance(location_id, currency_id)
    }

    pub fn list_balances(&self, location_filter: Option<&str>) -> Result<Vec<Balance>> {
        self.repository.list(location_filter)
    }

    /// The physical portion only, for the cuadre de caja.
    pub fn get_cash_position(&self, location_id: &str, currency_id: &str) -> Result<CashPosition> {
        let balance = self.repository.get_balance(location_id, currency_id)?;
        Ok(CashPosition {
            location_id: balance.location_id,
            currency_id: balance.currency_id,
            cash_amount: balance.cash_amount,
            coin_amount: balance.coin_amount,
            total_physical: balance.cash_amount + balance.coin_amount,
        })
    }

    /// Redistributes notes vs coins after a physical count. The total never
    /// changes here; discrepancies against the count become AJUSTE postings.
    pub fn update_cash_split(
        &self,
        location_id: &str,
        currency_id: &str,
        notes: Decimal,
        coins: Decimal,
    ) -> Result<Balance> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| BalanceError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            BalanceRepository::update_cash_split(tx_conn, location_id, currency_id, notes, coins)
        })
    }

    pub fn get_initial_balance_history(
        &self,
        location_id: &str,
        currency_id: &str,
    ) -> Result<Vec<InitialBalance>> {
        self.initial_repository.get_history(location_id, currency_id)
    }

    /// Assigns (or supersedes) the initial balance of a pair.
    ///
    /// In one transaction: the previous active row is deactivated, the new
    /// one inserted, and an informational SALDO_INICIAL movement is posted
    /// whose signed amount equals the balance delta the assignment caused,
    /// re-materializing the pair at its new recomputed value.
    pub fn assign_initial_balance(&self, new_initial: NewInitialBalance) -> Result<InitialBalance> {
        new_initial.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| BalanceError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let superseded = InitialBalanceRepository::deactivate_active(
                tx_conn,
                &new_initial.location_id,
                &new_initial.currency_id,
            )?;

            let now = chrono::Utc::now().naive_utc();
            let row = InitialBalanceDB {
                id: uuid::Uuid::new_v4().to_string(),
                location_id: new_initial.location_id.clone(),
                currency_id: new_initial.currency_id.clone(),
                amount: new_initial.amount.to_string(),
                assigned_by: new_initial.assigned_by.clone(),
                note: new_initial.note.clone(),
                is_active: true,
                assigned_at: now,
                created_at: now,
            };
            InitialBalanceRepository::insert(tx_conn, &row)?;

            let movements = LedgerRepository::query_pair(
                tx_conn,
                &new_initial.location_id,
                &new_initial.currency_id,
                None,
                None,
            )?;
            let target = recompute_pair(new_initial.amount, &movements).recomputed;

            let current = BalanceRepository::get_pair(
                tx_conn,
                &new_initial.location_id,
                &new_initial.currency_id,
            )?
            .map(|b| b.amount)
            .unwrap_or(Decimal::ZERO);

            post_movement(
                tx_conn,
                PostMovementInput {
                    location_id: &new_initial.location_id,
                    currency_id: &new_initial.currency_id,
                    kind: MovementKind::SaldoInicial,
                    amount: target - current,
                    channel: SettlementChannel::Cash,
                    user_id: &new_initial.assigned_by,
                    source_kind: SOURCE_KIND_INITIAL_BALANCE,
                    source_id: Some(&row.id),
                    description: Some(format!("Initial balance set to {}", new_initial.amount)),
                    allow_negative: true,
                },
            )?;

            if superseded > 0 {
                info!(
                    "Superseded {} initial balance(s) for pair ({}, {})",
                    superseded, new_initial.location_id, new_initial.currency_id
                );
            }

            InitialBalance::try_from(row)
        })
    }
}
