//! Error types for the voa library.
//!
//! All fallible operations in this crate return [`Result`]. The error
//! taxonomy mirrors the HTTP status codes a request layer would surface:
//! missing referenced entities are [`Error::NotFound`] (404), malformed
//! field values are [`Error::Validation`] (400), and business-rule
//! violations (duplicate unique fields, duplicate reservation pairs,
//! exceeded capacity, departed flights) are [`Error::Conflict`] (400).

use thiserror::Error;

/// Result type alias for operations that may fail with a voa error.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the voa library.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced entity does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource, e.g. `passenger 42`.
        resource: String,
    },

    /// A field value failed validation.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A business-rule conflict occurred.
    #[error("conflict: {details}")]
    Conflict {
        /// Details about the conflict.
        details: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The schema version this client expects.
        expected: i32,
        /// The schema version found in the database.
        found: i32,
    },
}

impl Error {
    /// Builds a `NotFound` error for an entity kind and id.
    #[must_use]
    pub fn not_found(kind: &str, id: i64) -> Self {
        Self::NotFound {
            resource: format!("{kind} {id}"),
        }
    }

    /// Builds a `Conflict` error from a message.
    #[must_use]
    pub fn conflict(details: impl Into<String>) -> Self {
        Self::Conflict {
            details: details.into(),
        }
    }

    /// The HTTP-style status code for this error.
    ///
    /// `NotFound` maps to 404, `Validation` and `Conflict` to 400, and
    /// everything else (storage, I/O, schema) to 500.
    ///
    /// # Examples
    ///
    /// ```
    /// use voa::Error;
    ///
    /// assert_eq!(Error::not_found("flight", 7).status_code(), 404);
    /// assert_eq!(Error::conflict("capacity exceeded").status_code(), 400);
    /// ```
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation { .. } | Self::Conflict { .. } => 400,
            Self::Database(_) | Self::Io(_) | Self::UnsupportedSchemaVersion { .. } => 500,
        }
    }

    /// Check if this error is a `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a `Conflict`.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<crate::passenger::ValidationError> for Error {
    fn from(err: crate::passenger::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<crate::flight::InvalidStateCodeError> for Error {
    fn from(err: crate::flight::InvalidStateCodeError) -> Self {
        Self::Validation {
            field: "state code".into(),
            message: err.to_string(),
        }
    }
}

impl From<crate::flight::InvalidCapacityError> for Error {
    fn from(err: crate::flight::InvalidCapacityError) -> Self {
        Self::Validation {
            field: "capacity".into(),
            message: err.to_string(),
        }
    }
}
