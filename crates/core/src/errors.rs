use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::balances::BalanceError;
use crate::currencies::CurrencyError;
use crate::exchanges::ExchangeError;
use crate::external_ops::ExternalOperationError;
use crate::ledger::LedgerError;
use crate::locations::LocationError;
use crate::reconciliation::ReconciliationError;
use crate::transfers::TransferError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Balance error: {0}")]
    Balance(#[from] BalanceError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("External operation error: {0}")]
    ExternalOperation(#[from] ExternalOperationError),

    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconciliationError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Currency error: {0}")]
    Currency(#[from] CurrencyError),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}
