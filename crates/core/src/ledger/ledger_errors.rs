use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Sign or arithmetic contradiction detected at append time. The entry
    /// is refused and nothing is written.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// An egress would drive the balance below zero without an explicit
    /// override. Aborts the whole compound operation.
    #[error(
        "Insufficient balance at location {location_id} for currency {currency_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientBalance {
        location_id: String,
        currency_id: String,
        available: Decimal,
        requested: Decimal,
    },
}

impl From<DieselError> for LedgerError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => LedgerError::NotFound("Record not found".to_string()),
            _ => LedgerError::DatabaseError(err.to_string()),
        }
    }
}

impl From<LedgerError> for DieselError {
    fn from(err: LedgerError) -> Self {
        // Lets ledger failures abort an enclosing diesel transaction
        DieselError::DatabaseError(
            diesel::result::DatabaseErrorKind::SerializationFailure,
            Box::new(format!("{}", err)),
        )
    }
}
