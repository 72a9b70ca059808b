use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::transfers_errors::TransferError;
use super::Result;
use crate::constants::*;
use crate::ledger::ledger_model::{balance_tolerance, parse_stored_decimal};

/// Lifecycle of an inter-branch transfer:
/// PENDIENTE -> EN_TRANSITO -> { APROBADO | CANCELADO }.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Pendiente,
    EnTransito,
    Aprobado,
    Cancelado,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pendiente => TRANSFER_STATUS_PENDIENTE,
            TransferStatus::EnTransito => TRANSFER_STATUS_EN_TRANSITO,
            TransferStatus::Aprobado => TRANSFER_STATUS_APROBADO,
            TransferStatus::Cancelado => TRANSFER_STATUS_CANCELADO,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Aprobado | TransferStatus::Cancelado)
    }
}

impl FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSFER_STATUS_PENDIENTE => Ok(TransferStatus::Pendiente),
            TRANSFER_STATUS_EN_TRANSITO => Ok(TransferStatus::EnTransito),
            TRANSFER_STATUS_APROBADO => Ok(TransferStatus::Aprobado),
            TRANSFER_STATUS_CANCELADO => Ok(TransferStatus::Cancelado),
            other => Err(format!("Unknown transfer status: {}", other)),
        }
    }
}

/// Delivery channel of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferChannel {
    Cash,
    Bank,
    Mixed,
}

impl TransferChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferChannel::Cash => CHANNEL_CASH,
            TransferChannel::Bank => CHANNEL_BANK,
            TransferChannel::Mixed => CHANNEL_MIXED,
        }
    }
}

impl FromStr for TransferChannel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CHANNEL_CASH => Ok(TransferChannel::Cash),
            CHANNEL_BANK => Ok(TransferChannel::Bank),
            CHANNEL_MIXED => Ok(TransferChannel::Mixed),
            other => Err(format!("Unknown transfer channel: {}", other)),
        }
    }
}

/// Domain model for an inter-branch transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    /// None for externally funded transfers (no origin debit).
    pub origin_location_id: Option<String>,
    pub destination_location_id: String,
    pub currency_id: String,
    pub amount: Decimal,
    pub channel: TransferChannel,
    pub cash_portion: Option<Decimal>,
    pub bank_portion: Option<Decimal>,
    pub status: TransferStatus,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transfer {
    /// Resolves the cash/bank apportioning of the amount.
    ///
    /// MIXED uses the caller-supplied split when it is internally consistent
    /// (both portions non-negative, summing to the amount within 0.01);
    /// otherwise an even split, with the rounding remainder on the bank leg.
    pub fn resolved_split(&self) -> (Decimal, Decimal) {
        match self.channel {
            TransferChannel::Cash => (self.amount, Decimal::ZERO),
            TransferChannel::Bank => (Decimal::ZERO, self.amount),
            TransferChannel::Mixed => {
                if let (Some(cash), Some(bank)) = (self.cash_portion, self.bank_portion) {
                    let consistent = cash >= Decimal::ZERO
                        && bank >= Decimal::ZERO
                        && (cash + bank - self.amount).abs() <= balance_tolerance();
                    if consistent {
                        return (cash, bank);
                    }
                }
                let cash = (self.amount / Decimal::TWO)
                    .round_dp_with_strategy(2, RoundingStrategy::ToZero);
                (cash, self.amount - cash)
            }
        }
    }
}

/// Input model for creating a transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub origin_location_id: Option<String>,
    pub destination_location_id: String,
    pub currency_id: String,
    pub amount: Decimal,
    pub channel: TransferChannel,
    pub cash_portion: Option<Decimal>,
    pub bank_portion: Option<Decimal>,
    pub note: Option<String>,
    pub created_by: String,
}

impl NewTransfer {
    pub fn validate(&self) -> Result<()> {
        if self.destination_location_id.trim().is_empty() {
            return Err(TransferError::InvalidData(
                "Destination location cannot be empty".to_string(),
            ));
        }
        if self.currency_id.trim().is_empty() {
            return Err(TransferError::InvalidData(
                "Currency cannot be empty".to_string(),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(TransferError::InvalidData(format!(
                "Transfer amount must be positive, got {}",
                self.amount
            )));
        }
        if let Some(ref origin) = self.origin_location_id {
            if origin == &self.destination_location_id {
                return Err(TransferError::InvalidData(
                    "Origin and destination must differ".to_string(),
                ));
            }
        }
        if self.created_by.trim().is_empty() {
            return Err(TransferError::InvalidData(
                "Creating user cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for transfers
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transfers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransferDB {
    pub id: String,
    pub origin_location_id: Option<String>,
    pub destination_location_id: String,
    pub currency_id: String,
    pub amount: String,
    pub channel: String,
    pub cash_portion: Option<String>,
    pub bank_portion: Option<String>,
    pub status: String,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TransferDB> for Transfer {
    type Error = TransferError;

    fn try_from(db: TransferDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            origin_location_id: db.origin_location_id,
            destination_location_id: db.destination_location_id,
            currency_id: db.currency_id,
            amount: parse_stored_decimal(&db.amount)?,
            channel: TransferChannel::from_str(&db.channel).map_err(TransferError::InvalidData)?,
            cash_portion: db
                .cash_portion
                .as_deref()
                .map(parse_stored_decimal)
                .transpose()?,
            bank_portion: db
                .bank_portion
                .as_deref()
                .map(parse_stored_decimal)
                .transpose()?,
            status: TransferStatus::from_str(&db.status).map_err(TransferError::InvalidData)?,
            note: db.note,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewTransfer> for TransferDB {
    fn from(new: NewTransfer) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: String::new(),
            origin_location_id: new.origin_location_id,
            destination_location_id: new.destination_location_id,
            currency_id: new.currency_id,
            amount: new.amount.to_string(),
            channel: new.channel.as_str().to_string(),
            cash_portion: new.cash_portion.map(|d| d.to_string()),
            bank_portion: new.bank_portion.map(|d| d.to_string()),
            status: TransferStatus::Pendiente.as_str().to_string(),
            note: new.note,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn transfer(channel: TransferChannel, amount: Decimal) -> Transfer {
        Transfer {
            id: "t1".to_string(),
            origin_location_id: Some("a".to_string()),
            destination_location_id: "b".to_string(),
            currency_id: "usd".to_string(),
            amount,
            channel,
            cash_portion: None,
            bank_portion: None,
            status: TransferStatus::Pendiente,
            note: None,
            created_by: "tester".to_string(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn single_channel_transfers_are_single_leg() {
        assert_eq!(
            transfer(TransferChannel::Cash, dec!(100)).resolved_split(),
            (dec!(100), dec!(0))
        );
        assert_eq!(
            transfer(TransferChannel::Bank, dec!(100)).resolved_split(),
            (dec!(0), dec!(100))
        );
    }

    #[test]
    fn mixed_uses_consistent_caller_split() {
        let mut t = transfer(TransferChannel::Mixed, dec!(100));
        t.cash_portion = Some(dec!(70));
        t.bank_portion = Some(dec!(30));
        assert_eq!(t.resolved_split(), (dec!(70), dec!(30)));
    }

    #[test]
    fn mixed_falls_back_to_even_split_when_inconsistent() {
        let mut t = transfer(TransferChannel::Mixed, dec!(100));
        t.cash_portion = Some(dec!(70));
        t.bank_portion = Some(dec!(50));
        assert_eq!(t.resolved_split(), (dec!(50.00), dec!(50.00)));
    }

    #[test]
    fn even_split_remainder_goes_to_bank() {
        let t = transfer(TransferChannel::Mixed, dec!(0.03));
        let (cash, bank) = t.resolved_split();
        assert_eq!(cash + bank, dec!(0.03));
        assert!(bank >= cash);
    }

    #[test]
    fn rejects_origin_equal_to_destination() {
        let new = NewTransfer {
            origin_location_id: Some("b".to_string()),
            destination_location_id: "b".to_string(),
            currency_id: "usd".to_string(),
            amount: dec!(10),
            channel: TransferChannel::Cash,
            cash_portion: None,
            bank_portion: None,
            note: None,
            created_by: "tester".to_string(),
        };
        assert!(new.validate().is_err());
    }
}
