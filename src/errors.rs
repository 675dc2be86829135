use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not connect to MySQL: {0}")]
    Connection(SqlxError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Password error: {0}")]
    Password(String),
}

impl AppError {
    /// Errors that should unwind the menus instead of being reported in place.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Input(_) | AppError::Connection(_))
    }
}

/// Rejected user input. Raised before any statement reaches the database.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a number.")]
    NotANumber { field: &'static str },

    #[error("{field} cannot be negative.")]
    Negative { field: &'static str },

    #[error("{field} must be a date in the format YYYY-MM-DD.")]
    InvalidDate { field: &'static str },

    #[error("{field} cannot be empty.")]
    Empty { field: &'static str },
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Input(err.to_string())
    }
}

impl From<inquire::InquireError> for AppError {
    fn from(err: inquire::InquireError) -> Self {
        AppError::Input(err.to_string())
    }
}
