use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid transition: transfer {id} is {status}, cannot {action}")]
    InvalidTransition {
        id: String,
        status: String,
        action: String,
    },

    #[error(
        "Insufficient balance at origin {location_id} for currency {currency_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientBalance {
        location_id: String,
        currency_id: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<DieselError> for TransferError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => TransferError::NotFound("Record not found".to_string()),
            _ => TransferError::DatabaseError(err.to_string()),
        }
    }
}
