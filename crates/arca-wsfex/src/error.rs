//! Export invoicing errors.

use arca_core::ValidationError;
use arca_soap::SoapError;
use arca_wsaa::WsaaError;
use thiserror::Error;

/// Failure of a WSFEXv1 operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invoice data failed local validation before any network traffic.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Ticket acquisition failed.
    #[error("auth failed: {0}")]
    Auth(#[from] WsaaError),

    /// The SOAP call failed at the transport level.
    #[error(transparent)]
    Soap(#[from] SoapError),

    /// The service reported an error payload.
    #[error("service error {code}: {message}")]
    Remote { code: String, message: String },
}
