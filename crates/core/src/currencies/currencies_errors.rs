use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurrencyError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for CurrencyError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => CurrencyError::NotFound("Record not found".to_string()),
            _ => CurrencyError::DatabaseError(err.to_string()),
        }
    }
}
