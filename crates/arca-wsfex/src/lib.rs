//! WSFEXv1 export electronic invoicing.
//!
//! Mirrors the domestic service for export documents: ticket acquisition
//! under the `wsfex` service key, auth block injection, typed remote
//! errors.

mod error;
mod service;
mod types;

pub use error::ServiceError;
pub use service::{WsfexService, SERVICE_KEY};
pub use types::{Destination, ExportAuthorization, ExportInvoice, ExportItem, UnitType};

/// Result alias for export invoicing operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
