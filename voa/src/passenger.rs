//! Passenger types and field validation.
//!
//! Passengers are root entities identified by a generated integer id.
//! The field rules come from the registration form: a full name with at
//! least a first and last token and no digits, an email stored lower-cased,
//! and an 11-digit document number. Uniqueness of email and document is
//! enforced by the persistence layer.

use serde::{Deserialize, Serialize};

/// A registered passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Generated identifier.
    pub id: i64,
    /// Full name (at least two tokens, no digits).
    pub full_name: String,
    /// Lower-cased email address.
    pub email: String,
    /// 11-digit document number.
    pub document: String,
}

/// Validated input for creating a passenger.
///
/// Construction runs all pure field validators; the email is normalized to
/// lower case. Uniqueness checks happen at insert time.
///
/// # Examples
///
/// ```
/// use voa::PassengerDraft;
///
/// let draft = PassengerDraft::new("Ana Souza", "Ana@Example.com", "12345678901").unwrap();
/// assert_eq!(draft.email(), "ana@example.com");
///
/// assert!(PassengerDraft::new("Ana", "ana@example.com", "12345678901").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PassengerDraft {
    full_name: String,
    email: String,
    document: String,
}

impl PassengerDraft {
    /// Creates a validated draft.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name has fewer than two tokens
    /// or contains digits, the email lacks `@`, or the document is not
    /// exactly 11 decimal digits.
    pub fn new(
        full_name: impl Into<String>,
        email: &str,
        document: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.into();
        let document = document.into();
        validate_full_name(&full_name)?;
        let email = normalize_email(email)?;
        validate_document(&document)?;
        Ok(Self {
            full_name,
            email,
            document,
        })
    }

    /// The validated full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The normalized (lower-cased) email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The validated document number.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }
}

/// A partial update for a passenger.
///
/// Only fields that are `Some` are applied; each is re-validated against
/// the same rules as creation, and uniqueness is only re-checked when the
/// value actually changes.
#[derive(Debug, Clone, Default)]
pub struct PassengerPatch {
    /// Replacement full name, if any.
    pub full_name: Option<String>,
    /// Replacement email, if any (normalized before storage).
    pub email: Option<String>,
    /// Replacement document number, if any.
    pub document: Option<String>,
}

impl PassengerPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement full name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Sets the replacement email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the replacement document number.
    #[must_use]
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.document.is_none()
    }
}

/// Validates a passenger full name.
///
/// The name must contain at least two whitespace-separated tokens and no
/// digit characters.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the first rule violated.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    if name.split_whitespace().count() < 2 {
        return Err(ValidationError {
            field: "full_name".into(),
            message: "name must contain at least a first and last name".into(),
        });
    }
    if name.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError {
            field: "full_name".into(),
            message: "name must not contain digits".into(),
        });
    }
    Ok(())
}

/// Normalizes an email address to lower case.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the address does not contain `@`.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ValidationError {
            field: "email".into(),
            message: "email must contain '@'".into(),
        });
    }
    Ok(email)
}

/// Validates a document number.
///
/// The document must be exactly 11 characters, all decimal digits.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the length or character set is wrong.
pub fn validate_document(document: &str) -> Result<(), ValidationError> {
    if document.len() != 11 || !document.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError {
            field: "document".into(),
            message: "document must be exactly 11 decimal digits".into(),
        });
    }
    Ok(())
}

/// Error type for passenger field validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}
