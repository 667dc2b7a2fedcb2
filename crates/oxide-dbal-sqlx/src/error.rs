//! Session errors and driver error capture.

use std::borrow::Cow;

use oxide_dbal_core::DriverError;
use sqlx::mysql::MySqlDatabaseError;

/// Errors raised while opening or closing a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Database error while connecting.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The URL names a database this crate cannot connect to.
    #[error("Unsupported database URL '{0}': expected postgres:// or mysql://")]
    UnsupportedUrl(String),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Converts a `sqlx` failure into a [`DriverError`].
///
/// `MySQL` failures carry the server error number (`1050`, `1146`, ...)
/// rather than the SQLSTATE, since that is what the `MySQL` dialect
/// classifies. Every other database error carries its SQLSTATE.
#[must_use]
pub fn driver_error(error: &sqlx::Error) -> DriverError {
    match error {
        sqlx::Error::Database(db) => {
            let code = db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|e| e.number().to_string())
                .or_else(|| db.code().map(Cow::into_owned));
            DriverError {
                code,
                message: db.message().to_string(),
            }
        }
        other => DriverError::message(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_have_no_code() {
        let err = driver_error(&sqlx::Error::RowNotFound);
        assert_eq!(err.code, None);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::UnsupportedUrl("sqlite::memory:".into());
        assert!(err.to_string().contains("sqlite::memory:"));
    }
}
