//! SOAP 1.1 plumbing shared by the ARCA web-service clients.
//!
//! Outgoing documents are built by string concatenation with explicit
//! escaping; incoming documents are scraped with quick-xml event loops.
//! Nothing in this crate knows about tickets or invoices.

mod client;
mod error;
mod xml;

pub use client::SoapClient;
pub use error::SoapError;
pub use xml::{envelope, records, text_of, texts_of, xml_escape};

/// Result alias for SOAP-level operations.
pub type Result<T> = std::result::Result<T, SoapError>;
