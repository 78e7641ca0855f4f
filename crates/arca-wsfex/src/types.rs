//! Export invoice domain types.

use arca_core::{CurrencyType, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An export invoice (comprobante tipo E family) to be authorised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInvoice {
    /// Wire code of the export document type (19 for facturas E).
    pub invoice_type_code: u16,
    pub point_of_sale: u32,
    pub invoice_number: u64,
    pub invoice_date: NaiveDate,
    /// Destination country code from the `DST_pais` parameter table.
    pub destination_code: u16,
    pub buyer_name: String,
    pub buyer_address: String,
    pub currency: CurrencyType,
    pub currency_rate: f64,
    pub total_amount: f64,
    pub items: Vec<ExportItem>,
}

impl ExportInvoice {
    /// Structural validation run before any network traffic.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.point_of_sale == 0 || self.point_of_sale > 9999 {
            return Err(ValidationError::new(
                "point_of_sale",
                "must be between 1 and 9999",
            ));
        }
        if self.invoice_number == 0 {
            return Err(ValidationError::new(
                "invoice_number",
                "must be greater than zero",
            ));
        }
        if self.buyer_name.is_empty() {
            return Err(ValidationError::new("buyer_name", "must not be empty"));
        }
        if self.total_amount <= 0.0 {
            return Err(ValidationError::new(
                "total_amount",
                "must be greater than zero",
            ));
        }
        if self.items.is_empty() {
            return Err(ValidationError::new("items", "at least one item required"));
        }
        Ok(())
    }
}

/// A line item on an export invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportItem {
    pub description: String,
    pub quantity: f64,
    pub unit_measure_code: u16,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Result of an export authorisation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportAuthorization {
    pub cae: String,
    pub cae_expiration: Option<NaiveDate>,
    pub invoice_number: u64,
    pub point_of_sale: u32,
    pub status: String,
}

/// An export destination country from the parameter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub code: String,
    pub description: String,
}

/// A measurement unit from the parameter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub code: String,
    pub description: String,
}
