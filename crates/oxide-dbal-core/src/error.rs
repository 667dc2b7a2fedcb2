//! Error types for schema management.

use crate::field::FieldKind;

/// A failure reported by the SQL-execution collaborator.
///
/// `code` carries the backend's native error code when the driver exposes
/// one (a SQLSTATE, a MySQL error number, `ORA-00942`, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}{}", .code.as_ref().map(|c| format!(" (native code {c})")).unwrap_or_default())]
pub struct DriverError {
    /// Native error code, if any.
    pub code: Option<String>,
    /// Driver message.
    pub message: String,
}

impl DriverError {
    /// Creates an error carrying a native code.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Creates an error with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// Coarse classification of a [`SchemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend cannot perform the operation at all.
    UnsupportedOperation,
    /// The backend cannot represent the field kind.
    UnsupportedType,
    /// The backend cannot apply a change in place.
    CannotAlter,
    /// The object being created already exists.
    AlreadyExists,
    /// The object being dropped or altered does not exist.
    NotFound,
    /// Any other backend failure.
    Backend,
    /// A catalog type could not be mapped to a field kind.
    UnknownNativeType,
    /// An operation failed and so did its cleanup.
    Compound,
    /// A definition or change set is malformed.
    InvalidDefinition,
    /// Manager options are inconsistent.
    InvalidConfig,
}

/// Errors raised by dialects and the schema manager.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    /// The backend cannot perform the operation.
    #[error("{backend} does not support {operation}")]
    UnsupportedOperation {
        /// Backend name.
        backend: &'static str,
        /// Description of the refused operation.
        operation: String,
    },

    /// The backend has no native type for a field kind.
    #[error("{backend} cannot declare '{kind}' fields")]
    UnsupportedType {
        /// Backend name.
        backend: &'static str,
        /// The field kind that was requested.
        kind: FieldKind,
    },

    /// The backend cannot apply a change in place.
    #[error("Cannot alter {change}: {reason}")]
    CannotAlter {
        /// The change that was refused (`remove`, `change.id.notnull`, ...).
        change: String,
        /// Why the backend refuses it.
        reason: String,
    },

    /// The object already exists.
    #[error("Object already exists: {source}")]
    AlreadyExists {
        /// The statement that failed.
        sql: String,
        /// The driver failure.
        source: DriverError,
    },

    /// The object does not exist.
    #[error("Object not found: {source}")]
    NotFound {
        /// The statement that failed.
        sql: String,
        /// The driver failure.
        source: DriverError,
    },

    /// Any other driver failure.
    #[error("Statement failed: {source}")]
    Backend {
        /// The statement that failed.
        sql: String,
        /// The driver failure.
        source: DriverError,
    },

    /// A catalog type has no abstract counterpart.
    #[error("Unknown {backend} native type '{native_type}'")]
    UnknownNativeType {
        /// Backend name.
        backend: &'static str,
        /// The native type as reported by the catalog.
        native_type: String,
    },

    /// An operation failed and the cleanup that followed failed as well.
    #[error("{original}; cleanup failed as well: {cleanup}")]
    Compound {
        /// The first failure.
        original: Box<SchemaError>,
        /// The failure raised while undoing partial work.
        cleanup: Box<SchemaError>,
    },

    /// A definition or change set is malformed.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// Manager options are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchemaError {
    /// Shorthand for [`SchemaError::UnsupportedOperation`].
    pub fn unsupported(backend: &'static str, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            backend,
            operation: operation.into(),
        }
    }

    /// Shorthand for [`SchemaError::CannotAlter`].
    pub fn cannot_alter(change: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CannotAlter {
            change: change.into(),
            reason: reason.into(),
        }
    }

    /// Combines a failure with the failure of its cleanup.
    #[must_use]
    pub fn compound(original: Self, cleanup: Self) -> Self {
        Self::Compound {
            original: Box::new(original),
            cleanup: Box::new(cleanup),
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::CannotAlter { .. } => ErrorKind::CannotAlter,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::UnknownNativeType { .. } => ErrorKind::UnknownNativeType,
            Self::Compound { .. } => ErrorKind::Compound,
            Self::InvalidDefinition(_) => ErrorKind::InvalidDefinition,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Returns the statement that failed, for driver errors.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::AlreadyExists { sql, .. } | Self::NotFound { sql, .. } | Self::Backend { sql, .. } => {
                Some(sql)
            }
            _ => None,
        }
    }

    /// Returns the driver failure, for driver errors.
    #[must_use]
    pub const fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::AlreadyExists { source, .. }
            | Self::NotFound { source, .. }
            | Self::Backend { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Wraps a driver failure according to a classification.
    pub(crate) fn from_driver(kind: ErrorKind, sql: String, source: DriverError) -> Self {
        match kind {
            ErrorKind::AlreadyExists => Self::AlreadyExists { sql, source },
            ErrorKind::NotFound => Self::NotFound { sql, source },
            _ => Self::Backend { sql, source },
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
