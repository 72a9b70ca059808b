use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::transfers_model::{NewTransfer, Transfer, TransferStatus};
use super::transfers_repository::TransferRepository;
use super::{Result, TransferError};
use crate::balances::BalanceRepository;
use crate::constants::SOURCE_KIND_TRANSFER;
use crate::db::get_connection;
use crate::ledger::{post_movement, MovementKind, PostMovementInput, SettlementChannel};

/// Orchestrates inter-branch transfers.
///
/// The origin debit happens on dispatch (PENDIENTE -> EN_TRANSITO), the
/// destination credit on approval (EN_TRANSITO -> APROBADO), each in its
/// own atomic unit. Cancelling an in-transit transfer reverses the origin
/// debit exactly and never touches the destination.
pub struct TransferService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    repository: TransferRepository,
}

impl TransferService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        let repository = TransferRepository::new(pool.clone());
        Self { pool, repository }
    }

    pub fn create_transfer(&self, new_transfer: NewTransfer) -> Result<Transfer> {
        new_transfer.validate()?;
        debug!(
            "Creating transfer of {} {} to {}",
            new_transfer.amount, new_transfer.currency_id, new_transfer.destination_location_id
        );

        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransferError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| TransferRepository::insert(tx_conn, new_transfer))
    }

    /// PENDIENTE -> EN_TRANSITO. Debits the origin (when there is one) after
    /// verifying it holds the full amount; on insufficient balance the whole
    /// unit aborts and no movement is written at either location.
    pub fn dispatch_transfer(&self, transfer_id: &str, acting_user: &str) -> Result<Transfer> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransferError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let transfer = TransferRepository::get(tx_conn, transfer_id)?;
            if transfer.status != TransferStatus::Pendiente {
                return Err(TransferError::InvalidTransition {
                    id: transfer.id,
                    status: transfer.status.as_str().to_string(),
                    action: "dispatch".to_string(),
                });
            }

            if let Some(ref origin) = transfer.origin_location_id {
                let available = BalanceRepository::get_pair(tx_conn, origin, &transfer.currency_id)
                    .map_err(|e| TransferError::DatabaseError(e.to_string()))?
                    .map(|b| b.amount)
                    .unwrap_or(Decimal::ZERO);
                if available < transfer.amount {
                    return Err(TransferError::InsufficientBalance {
                        location_id: origin.clone(),
                        currency_id: transfer.currency_id.clone(),
                        available,
                        requested: transfer.amount,
                    });
                }

                for (channel, portion) in Self::legs(&transfer) {
                    post_movement(
                        tx_conn,
                        PostMovementInput {
                            location_id: origin,
                            currency_id: &transfer.currency_id,
                            kind: MovementKind::Egreso,
                            amount: portion,
                            channel,
                            user_id: acting_user,
                            source_kind: SOURCE_KIND_TRANSFER,
                            source_id: Some(&transfer.id),
                            description: Some(format!(
                                "Transfer to {}",
                                transfer.destination_location_id
                            )),
                            allow_negative: false,
                        },
                    )?;
                }
            }

            TransferRepository::update_status(tx_conn, &transfer.id, TransferStatus::EnTransito)?;
            info!("Transfer {} dispatched", transfer.id);
            TransferRepository::get(tx_conn, &transfer.id)
        })
    }

    /// EN_TRANSITO -> APROBADO. Credits the destination with legs tagged by
    /// the same source id as the origin debit.
    pub fn approve_transfer(&self, transfer_id: &str, acting_user: &str) -> Result<Transfer> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransferError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let transfer = TransferRepository::get(tx_conn, transfer_id)?;
            if transfer.status != TransferStatus::EnTransito {
                return Err(TransferError::InvalidTransition {
                    id: transfer.id,
                    status: transfer.status.as_str().to_string(),
                    action: "approve".to_string(),
                });
            }

            for (channel, portion) in Self::legs(&transfer) {
                post_movement(
                    tx_conn,
                    PostMovementInput {
                        location_id: &transfer.destination_location_id,
                        currency_id: &transfer.currency_id,
                        kind: MovementKind::Ingreso,
                        amount: portion,
                        channel,
                        user_id: acting_user,
                        source_kind: SOURCE_KIND_TRANSFER,
                        source_id: Some(&transfer.id),
                        description: transfer
                            .origin_location_id
                            .as_ref()
                            .map(|origin| format!("Transfer from {}", origin)),
                        allow_negative: false,
                    },
                )?;
            }

            TransferRepository::update_status(tx_conn, &transfer.id, TransferStatus::Aprobado)?;
            info!("Transfer {} approved", transfer.id);
            TransferRepository::get(tx_conn, &transfer.id)
        })
    }

    /// PENDIENTE -> CANCELADO (nothing was posted) or EN_TRANSITO ->
    /// CANCELADO: the origin debit is reversed leg by leg, restoring the
    /// pre-transfer balance exactly. The destination is never touched.
    pub fn cancel_transfer(&self, transfer_id: &str, acting_user: &str) -> Result<Transfer> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransferError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|tx_conn| {
            let transfer = TransferRepository::get(tx_conn, transfer_id)?;
            match transfer.status {
                TransferStatus::Pendiente => {}
                TransferStatus::EnTransito => {
                    if let Some(ref origin) = transfer.origin_location_id {
                        for (channel, portion) in Self::legs(&transfer) {
                            post_movement(
                                tx_conn,
                                PostMovementInput {
                                    location_id: origin,
                                    currency_id: &transfer.currency_id,
                                    kind: MovementKind::Ingreso,
                                    amount: portion,
                                    channel,
                                    user_id: acting_user,
                                    source_kind: SOURCE_KIND_TRANSFER,
                                    source_id: Some(&transfer.id),
                                    description: Some("Transfer cancelled in transit".to_string()),
                                    allow_negative: false,
                                },
                            )?;
                        }
                    }
                }
                status => {
                    return Err(TransferError::InvalidTransition {
                        id: transfer.id,
                        status: status.as_str().to_string(),
                        action: "cancel".to_string(),
                    });
                }
            }

            TransferRepository::update_status(tx_conn, &transfer.id, TransferStatus::Cancelado)?;
            info!("Transfer {} cancelled", transfer.id);
            TransferRepository::get(tx_conn, &transfer.id)
        })
    }

    pub fn get_transfer(&self, transfer_id: &str) -> Result<Transfer> {
        self.repository.get_by_id(transfer_id)
    }

    pub fn list_transfers(&self, status_filter: Option<TransferStatus>) -> Result<Vec<Transfer>> {
        self.repository.list(status_filter)
    }

    /// Non-zero cash/bank legs of the transfer.
    fn legs(transfer: &Transfer) -> Vec<(SettlementChannel, Decimal)> {
        let (cash, bank) = transfer.resolved_split();
        let mut legs = Vec::with_capacity(2);
        if cash > Decimal::ZERO {
            legs.push((SettlementChannel::Cash, cash));
        }
        if bank > Decimal::ZERO {
            legs.push((SettlementChannel::Bank, bank));
        }
        legs
    }
}
