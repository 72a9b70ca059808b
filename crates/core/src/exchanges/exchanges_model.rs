use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::exchanges_errors::ExchangeError;
use super::Result;
use crate::constants::*;
use crate::ledger::ledger_model::{balance_tolerance, parse_stored_decimal};

/// Lifecycle of a currency exchange: PENDIENTE -> COMPLETADO (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeStatus {
    Pendiente,
    Completado,
}

impl ExchangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pendiente => EXCHANGE_STATUS_PENDIENTE,
            ExchangeStatus::Completado => EXCHANGE_STATUS_COMPLETADO,
        }
    }
}

impl FromStr for ExchangeStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            EXCHANGE_STATUS_PENDIENTE => Ok(ExchangeStatus::Pendiente),
            EXCHANGE_STATUS_COMPLETADO => Ok(ExchangeStatus::Completado),
            other => Err(format!("Unknown exchange status: {}", other)),
        }
    }
}

/// Domain model for a currency exchange at one branch.
///
/// The origin side is what the counterparty delivers (INGRESO in the origin
/// currency); the destination side is what the branch delivers (EGRESO in
/// the destination currency). Each side splits into a cash-settled and a
/// bank-settled portion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub id: String,
    pub location_id: String,
    pub origin_currency_id: String,
    pub origin_amount: Decimal,
    pub origin_cash: Decimal,
    pub origin_bank: Decimal,
    pub destination_currency_id: String,
    pub destination_amount: Decimal,
    pub destination_cash: Decimal,
    pub destination_bank: Decimal,
    /// Settled so far (the abono inicial until completion).
    pub paid_amount: Decimal,
    /// Saldo pendiente: `destination_amount - paid_amount`.
    pub pending_amount: Decimal,
    pub status: ExchangeStatus,
    pub customer_name: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating an exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExchange {
    pub location_id: String,
    pub origin_currency_id: String,
    pub origin_cash: Decimal,
    pub origin_bank: Decimal,
    pub destination_currency_id: String,
    pub destination_cash: Decimal,
    pub destination_bank: Decimal,
    /// Abono inicial. None settles the full destination amount immediately.
    pub initial_payment: Option<Decimal>,
    pub customer_name: Option<String>,
    pub created_by: String,
}

impl NewExchange {
    pub fn origin_total(&self) -> Decimal {
        self.origin_cash + self.origin_bank
    }

    pub fn destination_total(&self) -> Decimal {
        self.destination_cash + self.destination_bank
    }

    pub fn validate(&self) -> Result<()> {
        if self.location_id.trim().is_empty() {
            return Err(ExchangeError::InvalidData(
                "Location cannot be empty".to_string(),
            ));
        }
        if self.origin_currency_id.trim().is_empty()
            || self.destination_currency_id.trim().is_empty()
        {
            return Err(ExchangeError::InvalidData(
                "Both currencies are required".to_string(),
            ));
        }
        if self.origin_currency_id == self.destination_currency_id {
            return Err(ExchangeError::InvalidData(
                "Origin and destination currencies must differ".to_string(),
            ));
        }
        if self.origin_cash < Decimal::ZERO || self.origin_bank < Decimal::ZERO {
            return Err(ExchangeError::InvalidData(
                "Origin portions cannot be negative".to_string(),
            ));
        }
        if self.destination_cash < Decimal::ZERO || self.destination_bank < Decimal::ZERO {
            return Err(ExchangeError::InvalidData(
                "Destination portions cannot be negative".to_string(),
            ));
        }
        if self.origin_total() <= Decimal::ZERO {
            return Err(ExchangeError::InvalidData(
                "Origin amount must be positive".to_string(),
            ));
        }
        if self.destination_total() <= Decimal::ZERO {
            return Err(ExchangeError::InvalidData(
                "Destination amount must be positive".to_string(),
            ));
        }
        if let Some(payment) = self.initial_payment {
            if payment < Decimal::ZERO {
                return Err(ExchangeError::InvalidData(
                    "Initial payment cannot be negative".to_string(),
                ));
            }
            if payment > self.destination_total() + balance_tolerance() {
                return Err(ExchangeError::InvalidData(format!(
                    "Initial payment {} exceeds destination total {}",
                    payment,
                    self.destination_total()
                )));
            }
        }
        if self.created_by.trim().is_empty() {
            return Err(ExchangeError::InvalidData(
                "Creating user cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for exchanges
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeDB {
    pub id: String,
    pub location_id: String,
    pub origin_currency_id: String,
    pub origin_amount: String,
    pub origin_cash: String,
    pub origin_bank: String,
    pub destination_currency_id: String,
    pub destination_amount: String,
    pub destination_cash: String,
    pub destination_bank: String,
    pub paid_amount: String,
    pub pending_amount: String,
    pub status: String,
    pub customer_name: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ExchangeDB> for Exchange {
    type Error = ExchangeError;

    fn try_from(db: ExchangeDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            location_id: db.location_id,
            origin_currency_id: db.origin_currency_id,
            origin_amount: parse_stored_decimal(&db.origin_amount)?,
            origin_cash: parse_stored_decimal(&db.origin_cash)?,
            origin_bank: parse_stored_decimal(&db.origin_bank)?,
            destination_currency_id: db.destination_currency_id,
            destination_amount: parse_stored_decimal(&db.destination_amount)?,
            destination_cash: parse_stored_decimal(&db.destination_cash)?,
            destination_bank: parse_stored_decimal(&db.destination_bank)?,
            paid_amount: parse_stored_decimal(&db.paid_amount)?,
            pending_amount: parse_stored_decimal(&db.pending_amount)?,
            status: ExchangeStatus::from_str(&db.status).map_err(ExchangeError::InvalidData)?,
            customer_name: db.customer_name,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

/// Apportions a settled amount across the destination's cash and bank
/// portions, cash first.
pub(crate) fn settle_cash_first(
    destination_cash: Decimal,
    amount: Decimal,
) -> (Decimal, Decimal) {
    let cash = amount.min(destination_cash);
    (cash, amount - cash)
}
