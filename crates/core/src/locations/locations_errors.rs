use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for location-related operations
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for LocationError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => LocationError::NotFound("Record not found".to_string()),
            _ => LocationError::DatabaseError(err.to_string()),
        }
    }
}
