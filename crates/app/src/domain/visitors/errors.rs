//! Visitors service errors.

use jiff::Timestamp;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Malformed input, reported before any storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("visitor token is required")]
    SecretMissing,

    #[error("visitor name is required")]
    VisitorNameMissing,

    #[error("visitor name must be at most {max} characters")]
    VisitorNameTooLong { max: usize },

    #[error("visitor phone must be at most {max} characters")]
    VisitorPhoneTooLong { max: usize },

    #[error("duration must be between 1 and {max}")]
    DurationOutOfRange { max: u32 },

    #[error("note must be at most {max} characters")]
    NoteTooLong { max: usize },

    #[error("gate id must be at most {max} characters")]
    GateIdTooLong { max: usize },
}

#[derive(Debug, Error)]
pub enum VisitorsServiceError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// No token matches the presented secret, or no entry matches the identifier.
    #[error("visitor token or entry not found")]
    NotFound,

    #[error("visitor token expired at {expired_at}")]
    Expired { expired_at: Timestamp },

    #[error("visitor token has already been used")]
    AlreadyUsed,

    #[error("visitor already exited at {exited_at}")]
    AlreadyExited { exited_at: Timestamp },

    #[error("visitor token has no active entry")]
    NoActiveEntry,

    #[error("could not generate a unique visitor token after {attempts} attempts")]
    Generation { attempts: u32 },

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for VisitorsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            // The only unique constraint a write can trip is the one-active-entry-per-token index.
            Some(ErrorKind::UniqueViolation) => Self::AlreadyUsed,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
