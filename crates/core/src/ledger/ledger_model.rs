use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ledger_errors::LedgerError;
use super::Result;
use crate::constants::*;

/// Movement kinds recognised by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Ingreso,
    Egreso,
    Ajuste,
    SaldoInicial,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Ingreso => MOVEMENT_KIND_INGRESO,
            MovementKind::Egreso => MOVEMENT_KIND_EGRESO,
            MovementKind::Ajuste => MOVEMENT_KIND_AJUSTE,
            MovementKind::SaldoInicial => MOVEMENT_KIND_SALDO_INICIAL,
        }
    }

    /// Whether entries of this kind participate in recomputation.
    /// SALDO_INICIAL markers are informational; the amount they describe is
    /// read from `initial_balances` directly.
    pub fn counts_in_recompute(&self) -> bool {
        !matches!(self, MovementKind::SaldoInicial)
    }
}

impl FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            MOVEMENT_KIND_INGRESO => Ok(MovementKind::Ingreso),
            MOVEMENT_KIND_EGRESO => Ok(MovementKind::Egreso),
            MOVEMENT_KIND_AJUSTE => Ok(MovementKind::Ajuste),
            MOVEMENT_KIND_SALDO_INICIAL => Ok(MovementKind::SaldoInicial),
            other => Err(format!("Unknown movement kind: {}", other)),
        }
    }
}

/// Structural cash/bank flag on a movement. Never inferred from the
/// free-text description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementChannel {
    Cash,
    Bank,
}

impl SettlementChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementChannel::Cash => CHANNEL_CASH,
            SettlementChannel::Bank => CHANNEL_BANK,
        }
    }
}

impl FromStr for SettlementChannel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CHANNEL_CASH => Ok(SettlementChannel::Cash),
            CHANNEL_BANK => Ok(SettlementChannel::Bank),
            other => Err(format!("Unknown settlement channel: {}", other)),
        }
    }
}

/// Domain model for one immutable ledger row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    pub kind: MovementKind,
    /// Signed amount: > 0 for INGRESO, < 0 for EGRESO, either for AJUSTE.
    pub amount: Decimal,
    pub prior_balance: Decimal,
    pub new_balance: Decimal,
    pub channel: SettlementChannel,
    pub user_id: String,
    pub source_kind: String,
    pub source_id: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Database model for movements. Decimals are stored as TEXT.
#[derive(Queryable, Selectable, Identifiable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::movements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MovementDB {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    pub kind: String,
    pub amount: String,
    pub prior_balance: String,
    pub new_balance: String,
    pub channel: String,
    pub user_id: String,
    pub source_kind: String,
    pub source_id: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<MovementDB> for Movement {
    type Error = LedgerError;

    fn try_from(db: MovementDB) -> Result<Self> {
        let kind = MovementKind::from_str(&db.kind).map_err(LedgerError::InvalidData)?;
        let channel =
            SettlementChannel::from_str(&db.channel).map_err(LedgerError::InvalidData)?;
        Ok(Self {
            id: db.id,
            location_id: db.location_id,
            currency_id: db.currency_id,
            kind,
            amount: parse_stored_decimal(&db.amount)?,
            prior_balance: parse_stored_decimal(&db.prior_balance)?,
            new_balance: parse_stored_decimal(&db.new_balance)?,
            channel,
            user_id: db.user_id,
            source_kind: db.source_kind,
            source_id: db.source_id,
            description: db.description,
            created_at: db.created_at,
        })
    }
}

impl From<Movement> for MovementDB {
    fn from(domain: Movement) -> Self {
        Self {
            id: domain.id,
            location_id: domain.location_id,
            currency_id: domain.currency_id,
            kind: domain.kind.as_str().to_string(),
            amount: domain.amount.to_string(),
            prior_balance: domain.prior_balance.to_string(),
            new_balance: domain.new_balance.to_string(),
            channel: domain.channel.as_str().to_string(),
            user_id: domain.user_id,
            source_kind: domain.source_kind,
            source_id: domain.source_id,
            description: domain.description,
            created_at: domain.created_at,
        }
    }
}

/// Input model for a manual AJUSTE posting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdjustment {
    pub location_id: String,
    pub currency_id: String,
    /// Signed amount, taken at face value.
    pub amount: Decimal,
    pub channel: SettlementChannel,
    pub user_id: String,
    pub description: Option<String>,
}

impl NewAdjustment {
    pub fn validate(&self) -> Result<()> {
        if self.location_id.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Location ID cannot be empty".to_string(),
            ));
        }
        if self.currency_id.trim().is_empty() {
            return Err(LedgerError::InvalidData(
                "Currency ID cannot be empty".to_string(),
            ));
        }
        if self.amount.is_zero() {
            return Err(LedgerError::InvalidData(
                "Adjustment amount cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filter for ledger queries
#[derive(Debug, Clone, Default)]
pub struct MovementQuery {
    pub location_id: Option<String>,
    pub currency_id: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

pub(crate) fn parse_stored_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| LedgerError::InvalidData(format!("Stored decimal '{}' is invalid: {}", raw, e)))
}

/// Comparison tolerance for balance arithmetic: 0.01 currency units.
/// The single definition; every tolerance comparison calls this.
pub(crate) fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}
