use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::external_ops_errors::ExternalOperationError;
use super::Result;
use crate::ledger::ledger_model::parse_stored_decimal;
use crate::ledger::{MovementKind, SettlementChannel};

/// A remittance or payment handled on behalf of an external agency
/// (Western Union, MoneyGram and the like). The operation itself is the
/// business record; its balance effect is a single ledger movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalOperation {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    /// INGRESO for a payout collected from the agency, EGRESO for a
    /// disbursement to a customer.
    pub direction: MovementKind,
    pub amount: Decimal,
    pub channel: SettlementChannel,
    pub agency: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

/// Input model for recording an external operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExternalOperation {
    pub location_id: String,
    pub currency_id: String,
    pub direction: MovementKind,
    pub amount: Decimal,
    pub channel: SettlementChannel,
    pub agency: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
}

impl NewExternalOperation {
    pub fn validate(&self) -> Result<()> {
        if self.location_id.trim().is_empty() {
            return Err(ExternalOperationError::InvalidData(
                "Location cannot be empty".to_string(),
            ));
        }
        if self.currency_id.trim().is_empty() {
            return Err(ExternalOperationError::InvalidData(
                "Currency cannot be empty".to_string(),
            ));
        }
        if !matches!(self.direction, MovementKind::Ingreso | MovementKind::Egreso) {
            return Err(ExternalOperationError::InvalidData(format!(
                "Direction must be INGRESO or EGRESO, got {}",
                self.direction.as_str()
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ExternalOperationError::InvalidData(format!(
                "Amount must be positive, got {}",
                self.amount
            )));
        }
        if self.agency.trim().is_empty() {
            return Err(ExternalOperationError::InvalidData(
                "Agency cannot be empty".to_string(),
            ));
        }
        if self.created_by.trim().is_empty() {
            return Err(ExternalOperationError::InvalidData(
                "Creating user cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for external operations
#[derive(Queryable, Selectable, Identifiable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::external_operations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExternalOperationDB {
    pub id: String,
    pub location_id: String,
    pub currency_id: String,
    pub direction: String,
    pub amount: String,
    pub channel: String,
    pub agency: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ExternalOperationDB> for ExternalOperation {
    type Error = ExternalOperationError;

    fn try_from(db: ExternalOperationDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            location_id: db.location_id,
            currency_id: db.currency_id,
            direction: MovementKind::from_str(&db.direction)
                .map_err(ExternalOperationError::InvalidData)?,
            amount: parse_stored_decimal(&db.amount)
                .map_err(|e| ExternalOperationError::InvalidData(e.to_string()))?,
            channel: SettlementChannel::from_str(&db.channel)
                .map_err(ExternalOperationError::InvalidData)?,
            agency: db.agency,
            reference: db.reference,
            description: db.description,
            created_by: db.created_by,
            created_at: db.created_at,
        })
    }
}
