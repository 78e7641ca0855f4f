//! Authentication errors.

use arca_soap::SoapError;
use thiserror::Error;

/// Failure while acquiring an access ticket.
#[derive(Debug, Error)]
pub enum WsaaError {
    /// Certificate or private key could not be parsed.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// CMS envelope construction failed.
    #[error("CMS signing failed: {0}")]
    Signing(#[from] openssl::error::ErrorStack),

    /// The SOAP exchange with the authentication endpoint failed.
    #[error("login exchange failed: {0}")]
    Soap(#[from] SoapError),

    /// The endpoint answered, but not with a parseable ticket.
    #[error("invalid login response: {0}")]
    InvalidResponse(String),
}
