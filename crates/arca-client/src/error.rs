//! Client-management errors.

use arca_core::ValidationError;
use arca_wsaa::WsaaError;
use thiserror::Error;

/// Failure at the client-management layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The supplied credentials failed validation; no I/O was attempted.
    #[error(transparent)]
    InvalidCredentials(#[from] ValidationError),

    /// The operation was attempted on a closed client.
    #[error("client is closed")]
    Closed,

    /// Constructing a company client failed.
    #[error("failed to create client: {source}")]
    CreateClient {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Ticket acquisition failed (health probe).
    #[error("health check failed: {0}")]
    Auth(#[from] WsaaError),
}

impl ClientError {
    pub(crate) fn create(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ClientError::CreateClient {
            source: Box::new(source),
        }
    }
}
