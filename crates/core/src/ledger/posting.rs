use chrono::Utc;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::ledger_model::{Movement, MovementDB, MovementKind, SettlementChannel};
use super::ledger_repository::LedgerRepository;
use super::{LedgerError, Result};
use crate::balances::BalanceRepository;

/// Input for the canonical posting primitive.
#[derive(Debug, Clone)]
pub struct PostMovementInput<'a> {
    pub location_id: &'a str,
    pub currency_id: &'a str,
    pub kind: MovementKind,
    /// Unsigned magnitude for INGRESO/EGRESO (the sign is derived from the
    /// kind); signed amount for AJUSTE and SALDO_INICIAL.
    pub amount: Decimal,
    pub channel: SettlementChannel,
    pub user_id: &'a str,
    pub source_kind: &'a str,
    pub source_id: Option<&'a str>,
    pub description: Option<String>,
    /// Permits an egress or negative adjustment to drive the balance below
    /// zero. Set by manual adjustments and reconciliation corrections only.
    pub allow_negative: bool,
}

/// Appends one movement and re-materializes the pair's balance, atomically.
///
/// This is the only function in the repository that mutates a balance: the
/// live orchestrator (transfers, exchanges, external operations), manual
/// adjustments and reconciliation corrections all post through here, inside
/// whatever transaction the caller already opened.
pub fn post_movement(conn: &mut SqliteConnection, input: PostMovementInput) -> Result<Movement> {
    if input.location_id.trim().is_empty() {
        return Err(LedgerError::InvalidData(
            "Location ID cannot be empty".to_string(),
        ));
    }
    if input.currency_id.trim().is_empty() {
        return Err(LedgerError::InvalidData(
            "Currency ID cannot be empty".to_string(),
        ));
    }
    if input.user_id.trim().is_empty() {
        return Err(LedgerError::InvalidData(
            "Acting user cannot be empty".to_string(),
        ));
    }

    let signed_amount = match input.kind {
        MovementKind::Ingreso => {
            if input.amount <= Decimal::ZERO {
                return Err(LedgerError::InvariantViolation(format!(
                    "INGRESO magnitude must be positive, got {}",
                    input.amount
                )));
            }
            input.amount
        }
        MovementKind::Egreso => {
            if input.amount <= Decimal::ZERO {
                return Err(LedgerError::InvariantViolation(format!(
                    "EGRESO magnitude must be positive, got {}",
                    input.amount
                )));
            }
            -input.amount
        }
        MovementKind::Ajuste | MovementKind::SaldoInicial => input.amount,
    };

    let prior_balance = BalanceRepository::get_pair(conn, input.location_id, input.currency_id)
        .map_err(|e| LedgerError::DatabaseError(e.to_string()))?
        .map(|b| b.amount)
        .unwrap_or(Decimal::ZERO);
    let new_balance = prior_balance + signed_amount;

    if new_balance < Decimal::ZERO && signed_amount < Decimal::ZERO && !input.allow_negative {
        return Err(LedgerError::InsufficientBalance {
            location_id: input.location_id.to_string(),
            currency_id: input.currency_id.to_string(),
            available: prior_balance,
            requested: signed_amount.abs(),
        });
    }

    let movement_db = MovementDB {
        id: uuid::Uuid::new_v4().to_string(),
        location_id: input.location_id.to_string(),
        currency_id: input.currency_id.to_string(),
        kind: input.kind.as_str().to_string(),
        amount: signed_amount.to_string(),
        prior_balance: prior_balance.to_string(),
        new_balance: new_balance.to_string(),
        channel: input.channel.as_str().to_string(),
        user_id: input.user_id.to_string(),
        source_kind: input.source_kind.to_string(),
        source_id: input.source_id.map(|s| s.to_string()),
        description: input.description,
        created_at: Utc::now().naive_utc(),
    };

    LedgerRepository::insert(conn, &movement_db)?;

    BalanceRepository::apply(
        conn,
        input.location_id,
        input.currency_id,
        new_balance,
        input.channel,
        signed_amount,
    )
    .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;

    Movement::try_from(movement_db)
}
