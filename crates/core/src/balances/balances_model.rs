use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balances_errors::BalanceError;
use super::Result;
use crate::ledger::ledger_model::parse_stored_decimal;

/// Materialized current balance for one (location, currency) pair.
///
/// Always re-derivable as the active initial balance plus the signed sum of
/// the pair's ledger history (excluding SALDO_INICIAL markers). The row is
/// written only through `ledger::posting::post_movement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    pub amount: Decimal,
    /// Physical-note portion of the cash on hand.
    pub cash_amount: Decimal,
    /// Physical-coin portion of the cash on hand.
    pub coin_amount: Decimal,
    /// Bank-held portion; excluded from physical cash counts.
    pub bank_amount: Decimal,
    pub updated_at: NaiveDateTime,
}

/// Database model for balances. Decimals stored as TEXT.
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::balances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BalanceDB {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    pub amount: String,
    pub cash_amount: String,
    pub coin_amount: String,
    pub bank_amount: String,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<BalanceDB> for Balance {
    type Error = BalanceError;

    fn try_from(db: BalanceDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            location_id: db.location_id,
            currency_id: db.currency_id,
            amount: parse_stored_decimal(&db.amount)?,
            cash_amount: parse_stored_decimal(&db.cash_amount)?,
            coin_amount: parse_stored_decimal(&db.coin_amount)?,
            bank_amount: parse_stored_decimal(&db.bank_amount)?,
            updated_at: db.updated_at,
        })
    }
}

/// The cash-only view handed to the end-of-day count workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashPosition {
    pub location_id: String,
    pub currency_id: String,
    pub cash_amount: Decimal,
    pub coin_amount: Decimal,
    pub total_physical: Decimal,
}

/// Domain model for an initial-balance assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialBalance {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    pub amount: Decimal,
    pub assigned_by: String,
    pub note: Option<String>,
    pub is_active: bool,
    pub assigned_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::initial_balances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InitialBalanceDB {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    pub amount: String,
    pub assigned_by: String,
    pub note: Option<String>,
    pub is_active: bool,
    pub assigned_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl TryFrom<InitialBalanceDB> for InitialBalance {
    type Error = BalanceError;

    fn try_from(db: InitialBalanceDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            location_id: db.location_id,
            currency_id: db.currency_id,
            amount: parse_stored_decimal(&db.amount)?,
            assigned_by: db.assigned_by,
            note: db.note,
            is_active: db.is_active,
            assigned_at: db.assigned_at,
            created_at: db.created_at,
        })
    }
}

/// Input model for assigning (or superseding) an initial balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInitialBalance {
    pub location_id: String,
    pub currency_id: String,
    pub amount: Decimal,
    pub assigned_by: String,
    pub note: Option<String>,
}

impl NewInitialBalance {
    pub fn validate(&self) -> Result<()> {
        if self.location_id.trim().is_empty() {
            return Err(BalanceError::InvalidData(
                "Location ID cannot be empty".to_string(),
            ));
        }
        if self.currency_id.trim().is_empty() {
            return Err(BalanceError::InvalidData(
                "Currency ID cannot be empty".to_string(),
            ));
        }
        if self.amount < Decimal::ZERO {
            return Err(BalanceError::InvalidData(
                "Initial balance cannot be negative".to_string(),
            ));
        }
        if self.assigned_by.trim().is_empty() {
            return Err(BalanceError::InvalidData(
                "Assigning user cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
