//! SOAP transport and parsing errors.

use thiserror::Error;

/// Failure while talking SOAP to an ARCA endpoint.
#[derive(Debug, Error)]
pub enum SoapError {
    /// The endpoint answered with a non-200 status.
    #[error("HTTP {status} from {url}")]
    Status {
        status: u16,
        url: String,
    },

    /// The configured request timeout elapsed.
    #[error("request to {url} timed out")]
    TimedOut { url: String },

    /// Connection-level failure (DNS, TLS, reset).
    #[error("request to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint reported a SOAP fault.
    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    /// The response parsed as XML but lacked the expected structure.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SoapError {
    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SoapError::Status { .. } | SoapError::TimedOut { .. } | SoapError::Connection { .. }
        )
    }
}
