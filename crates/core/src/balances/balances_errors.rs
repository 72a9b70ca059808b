use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<DieselError> for BalanceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => BalanceError::NotFound("Record not found".to_string()),
            _ => BalanceError::DatabaseError(err.to_string()),
        }
    }
}
