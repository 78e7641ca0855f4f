//! Manager configuration.

use arca_core::ValidationError;
use std::time::Duration;

/// Configuration for a [`ClientManager`](crate::ClientManager).
///
/// # Example
///
/// ```
/// use arca_client::ManagerConfig;
/// use std::time::Duration;
///
/// let config = ManagerConfig::builder()
///     .max_cached_clients(10)
///     .client_idle_timeout(Duration::from_secs(600))
///     .build();
/// assert_eq!(config.max_cached_clients, 10);
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Upper bound on simultaneously cached company clients.
    ///
    /// Default: 100
    pub max_cached_clients: usize,

    /// How long a cached client may go unused before it is evicted.
    ///
    /// Default: 30 minutes
    pub client_idle_timeout: Duration,

    /// Per-request HTTP timeout applied to every outgoing call.
    ///
    /// Default: 30 seconds
    pub http_timeout: Duration,

    /// Retry budget handed to the business services for transient
    /// transport failures. Authentication exchanges are never retried.
    ///
    /// Default: 3
    pub max_retry_attempts: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_cached_clients: 100,
            client_idle_timeout: Duration::from_secs(30 * 60),
            http_timeout: Duration::from_secs(30),
            max_retry_attempts: 3,
        }
    }
}

impl ManagerConfig {
    /// Create a new config builder.
    #[must_use]
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }

    /// Rejects unusable bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_cached_clients == 0 {
            return Err(ValidationError::new(
                "max_cached_clients",
                "must be greater than zero",
            ));
        }
        if self.client_idle_timeout.is_zero() {
            return Err(ValidationError::new(
                "client_idle_timeout",
                "must be greater than zero",
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(ValidationError::new(
                "http_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Builder for [`ManagerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ManagerConfigBuilder {
    max_cached_clients: Option<usize>,
    client_idle_timeout: Option<Duration>,
    http_timeout: Option<Duration>,
    max_retry_attempts: Option<u32>,
}

impl ManagerConfigBuilder {
    #[must_use]
    pub fn max_cached_clients(mut self, max: usize) -> Self {
        self.max_cached_clients = Some(max);
        self
    }

    #[must_use]
    pub fn client_idle_timeout(mut self, timeout: Duration) -> Self {
        self.client_idle_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.max_retry_attempts = Some(attempts);
        self
    }

    /// Build the configuration, filling unset fields with defaults.
    #[must_use]
    pub fn build(self) -> ManagerConfig {
        let default = ManagerConfig::default();
        ManagerConfig {
            max_cached_clients: self.max_cached_clients.unwrap_or(default.max_cached_clients),
            client_idle_timeout: self
                .client_idle_timeout
                .unwrap_or(default.client_idle_timeout),
            http_timeout: self.http_timeout.unwrap_or(default.http_timeout),
            max_retry_attempts: self.max_retry_attempts.unwrap_or(default.max_retry_attempts),
        }
    }
}
