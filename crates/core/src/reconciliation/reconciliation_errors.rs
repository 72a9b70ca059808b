use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::balances::BalanceError;
use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Balance error: {0}")]
    Balance(#[from] BalanceError),
}

impl From<DieselError> for ReconciliationError {
    fn from(err: DieselError) -> Self {
        ReconciliationError::DatabaseError(err.to_string())
    }
}
