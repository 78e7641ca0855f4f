//! Shared vocabulary for the ARCA e-invoicing client library.
//!
//! This crate provides the types every other crate in the workspace builds
//! on: strongly typed company identifiers, validated CUIT fiscal numbers,
//! the ARCA environment/endpoint mapping, immutable company credentials and
//! the invoice vocabulary shared by the domestic and export services.

mod credentials;
mod cuit;
mod environment;
mod error;
mod ids;
mod types;

pub use credentials::CompanyCredentials;
pub use cuit::Cuit;
pub use environment::Environment;
pub use error::{Result, ValidationError};
pub use ids::CompanyId;
pub use types::{
    ConceptType, Currency, CurrencyType, DocumentType, InvoiceType,
};
