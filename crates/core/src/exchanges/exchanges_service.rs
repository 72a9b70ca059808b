use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::exchanges_model::{settle_cash_first, Exchange, ExchangeDB, ExchangeStatus, NewExchange};
use super::exchanges_repository::ExchangeRepository;
use super::{ExchangeError, Result};
use crate::constants::SOURCE_KIND_EXCHANGE;
use crate::db::get_connection;
use crate::ledger::{post_movement, MovementKind, PostMovementInput, SettlementChannel};
use crate::ledger::ledger_model::balance_tolerance;

/// Orchestrates currency exchanges at a branch.
///
/// Creation posts the origin-side INGRESO legs and the settled portion of
/// the destination-side EGRESO legs in one atomic unit. A partial
/// settlement (abono inicial) leaves the exchange PENDIENTE with a saldo
/// pendiente; completion posts the residual and is guarded against double
/// posting.
pub struct ExchangeService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    repository: ExchangeRepository,
}

impl ExchangeService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        let repository = ExchangeRepository::new(pool.clone());
        Self { pool, repository }
    }

    pub fn create_exchange(&self, new_exchange: NewExchange) -> Result<Exchange> {
        new_exchange.validate()?;

        let destination_total = new_exchange.destination_total();
        let payment = new_exchange.initial_payment.unwrap_or(destination_total);
        let mut pending = destination_total - payment;
        if pending.abs() <= balance_tolerance() {
            pending = Decimal::ZERO;
        }
        let status = if pending.is_zero() {
            ExchangeStatus::Completado
        } else {
            ExchangeStatus::Pendiente
        };

        debug!(
            "Creating exchange at {}: {} {} in, {} {} out (payment {}, pending {})",
            new_exchange.location_id,
            new_exchange.origin_total(),
            new_exchange.origin_currency_id,
            destination_total,
            new_exchange.destination_currency_id,
            payment,
            pending
        );

        let mut conn = get_connection(&self.pool)
            .map_err(|e| ExchangeError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let now = chrono::Utc::now().naive_utc();
            let row = ExchangeDB {
                id: uuid::Uuid::new_v4().to_string(),
                location_id: new_exchange.location_id.clone(),
                origin_currency_id: new_exchange.origin_currency_id.clone(),
                origin_amount: new_exchange.origin_total().to_string(),
                origin_cash: new_exchange.origin_cash.to_string(),
                origin_bank: new_exchange.origin_bank.to_string(),
                destination_currency_id: new_exchange.destination_currency_id.clone(),
                destination_amount: destination_total.to_string(),
                destination_cash: new_exchange.destination_cash.to_string(),
                destination_bank: new_exchange.destination_bank.to_string(),
                paid_amount: payment.to_string(),
                pending_amount: pending.to_string(),
                status: status.as_str().to_string(),
                customer_name: new_exchange.customer_name.clone(),
                created_by: new_exchange.created_by.clone(),
                created_at: now,
                updated_at: now,
            };
            let exchange = ExchangeRepository::insert(tx_conn, &row)?;

            // Origin side: what the counterparty delivered.
            for (channel, portion) in [
                (SettlementChannel::Cash, new_exchange.origin_cash),
                (SettlementChannel::Bank, new_exchange.origin_bank),
            ] {
                if portion <= Decimal::ZERO {
                    continue;
                }
                post_movement(
                    tx_conn,
                    PostMovementInput {
                        location_id: &new_exchange.location_id,
                        currency_id: &new_exchange.origin_currency_id,
                        kind: MovementKind::Ingreso,
                        amount: portion,
                        channel,
                        user_id: &new_exchange.created_by,
                        source_kind: SOURCE_KIND_EXCHANGE,
                        source_id: Some(&exchange.id),
                        description: Some(format!(
                            "Exchange to {}",
                            new_exchange.destination_currency_id
                        )),
                        allow_negative: false,
                    },
                )?;
            }

            // Destination side: only the settled portion, cash first.
            Self::post_destination_legs(tx_conn, &exchange, payment, &new_exchange.created_by)?;

            info!("Exchange {} created ({})", exchange.id, status.as_str());
            ExchangeRepository::get(tx_conn, &exchange.id)
        })
    }

    /// Settles the saldo pendiente and transitions to COMPLETADO. Rejected
    /// on an already-COMPLETADO exchange with zero movements written.
    pub fn complete_exchange(&self, exchange_id: &str, acting_user: &str) -> Result<Exchange> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| ExchangeError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let exchange = ExchangeRepository::get(tx_conn, exchange_id)?;
            if exchange.status == ExchangeStatus::Completado {
                return Err(ExchangeError::AlreadyCompleted(exchange.id));
            }

            let residual = exchange.pending_amount;
            if residual > Decimal::ZERO {
                // The abono inicial consumed destination cash first; the
                // residual continues from where it stopped.
                let (already_cash, _) =
                    settle_cash_first(exchange.destination_cash, exchange.paid_amount);
                let remaining_cash = exchange.destination_cash - already_cash;
                let (residual_cash, residual_bank) = settle_cash_first(remaining_cash, residual);

                for (channel, portion) in [
                    (SettlementChannel::Cash, residual_cash),
                    (SettlementChannel::Bank, residual_bank),
                ] {
                    if portion <= Decimal::ZERO {
                        continue;
                    }
                    post_movement(
                        tx_conn,
                        PostMovementInput {
                            location_id: &exchange.location_id,
                            currency_id: &exchange.destination_currency_id,
                            kind: MovementKind::Egreso,
                            amount: portion,
                            channel,
                            user_id: acting_user,
                            source_kind: SOURCE_KIND_EXCHANGE,
                            source_id: Some(&exchange.id),
                            description: Some("Exchange residual settlement".to_string()),
                            allow_negative: false,
                        },
                    )?;
                }
            }

            ExchangeRepository::mark_settled(
                tx_conn,
                &exchange.id,
                exchange.destination_amount,
                Decimal::ZERO,
                ExchangeStatus::Completado,
            )?;

            info!("Exchange {} completed", exchange.id);
            ExchangeRepository::get(tx_conn, &exchange.id)
        })
    }

    pub fn get_exchange(&self, exchange_id: &str) -> Result<Exchange> {
        self.repository.get_by_id(exchange_id)
    }

    pub fn list_exchanges(&self, status_filter: Option<ExchangeStatus>) -> Result<Vec<Exchange>> {
        self.repository.list(status_filter)
    }

    fn post_destination_legs(
        conn: &mut SqliteConnection,
        exchange: &Exchange,
        payment: Decimal,
        acting_user: &str,
    ) -> Result<()> {
        if payment <= Decimal::ZERO {
            return Ok(());
        }

        let (cash, bank) = settle_cash_first(exchange.destination_cash, payment);
        for (channel, portion) in [
            (SettlementChannel::Cash, cash),
            (SettlementChannel::Bank, bank),
        ] {
            if portion <= Decimal::ZERO {
                continue;
            }
            post_movement(
                conn,
                PostMovementInput {
                    location_id: &exchange.location_id,
                    currency_id: &exchange.destination_currency_id,
                    kind: MovementKind::Egreso,
                    amount: portion,
                    channel,
                    user_id: acting_user,
                    source_kind: SOURCE_KIND_EXCHANGE,
                    source_id: Some(&exchange.id),
                    description: Some(format!("Exchange from {}", exchange.origin_currency_id)),
                    allow_negative: false,
                },
            )?;
        }

        Ok(())
    }
}
