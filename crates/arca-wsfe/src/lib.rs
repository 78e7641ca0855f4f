//! WSFEv1 domestic electronic invoicing.
//!
//! Every operation acquires an access ticket for the `wsfe` service key,
//! attaches the `{token, sign, cuit}` auth block to the outgoing SOAP
//! request and surfaces remote error blocks as typed errors.

mod error;
mod service;
mod types;

pub use error::ServiceError;
pub use service::{WsfeService, SERVICE_KEY};
pub use types::{
    Authorization, Invoice, InvoiceItem, InvoiceQuery, LastInvoice, ParameterRecord,
    QueriedInvoice,
};

/// Result alias for domestic invoicing operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
