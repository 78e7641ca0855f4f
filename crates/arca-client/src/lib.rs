//! Multi-tenant client management for the ARCA e-invoicing services.
//!
//! A [`ClientManager`] hands out one long-lived [`CompanyClient`] per
//! company, amortising credential parsing and authentication handshakes
//! behind a bounded cache with LRU eviction and idle expiry.
//!
//! # Example
//!
//! ```no_run
//! use arca_client::{ClientManager, ManagerConfig};
//! use arca_core::{CompanyCredentials, CompanyId, Cuit, Environment};
//!
//! # async fn example(cert: Vec<u8>, key: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ClientManager::new(ManagerConfig::default());
//!
//! let credentials = CompanyCredentials::new(
//!     CompanyId::new("acme-sa")?,
//!     Cuit::parse("20-26756539-3")?,
//!     Environment::Testing,
//!     cert,
//!     key,
//! )?;
//!
//! let client = manager.get_client(&credentials)?;
//! let last = client.wsfe()?.last_authorized(1, 6).await?;
//! println!("next invoice number: {}", last.invoice_number + 1);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod manager;

pub use client::{CompanyClient, CompanyInfo};
pub use config::{ManagerConfig, ManagerConfigBuilder};
pub use error::ClientError;
pub use manager::{CacheStats, ClientManager};

/// Result alias for client-management operations.
pub type Result<T> = std::result::Result<T, ClientError>;
