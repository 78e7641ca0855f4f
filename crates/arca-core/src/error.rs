//! Validation errors shared across the workspace.

use serde::Serialize;
use thiserror::Error;

/// Input validation failure, tagged with the offending field.
///
/// Raised before any network traffic: malformed CUITs, empty identifiers,
/// missing key material and structurally invalid invoices all surface as
/// this type so callers can map failures back to their own input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// The field that failed validation (e.g. `"cuit"`, `"certificate"`).
    pub field: String,
    /// Description of the failure.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result alias for validation-level operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
