use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Completion is idempotent-guarded: a COMPLETADO exchange can never be
    /// settled again, so no movement can double-post.
    #[error("Exchange {0} is already COMPLETADO")]
    AlreadyCompleted(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<DieselError> for ExchangeError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => ExchangeError::NotFound("Record not found".to_string()),
            _ => ExchangeError::DatabaseError(err.to_string()),
        }
    }
}
