//! Domestic invoice domain types.

use arca_core::{ConceptType, CurrencyType, DocumentType, InvoiceType, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An invoice to be authorised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_type: InvoiceType,
    pub point_of_sale: u32,
    /// Next invoice number for the point of sale; callers usually obtain it
    /// from a last-authorized lookup plus one.
    pub invoice_number: u64,
    pub concept: ConceptType,
    pub currency: CurrencyType,
    /// Exchange rate against the peso; `1.0` for peso invoices.
    pub currency_rate: f64,
    pub invoice_date: NaiveDate,
    pub buyer_document_type: DocumentType,
    pub buyer_document_number: String,
    /// Net amount before tax.
    pub net_amount: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
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
        if self.total_amount <= 0.0 {
            return Err(ValidationError::new(
                "total_amount",
                "must be greater than zero",
            ));
        }
        if self.items.is_empty() {
            return Err(ValidationError::new("items", "at least one item required"));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.description.is_empty() {
                return Err(ValidationError::new(
                    format!("items[{i}].description"),
                    "must not be empty",
                ));
            }
            if item.quantity <= 0.0 {
                return Err(ValidationError::new(
                    format!("items[{i}].quantity"),
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

/// A line item on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Lookup key for a previously submitted invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceQuery {
    pub invoice_type: InvoiceType,
    pub point_of_sale: u32,
    pub invoice_number: u64,
}

/// Result of an authorisation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    /// Electronic authorisation code.
    pub cae: String,
    pub cae_expiration: Option<NaiveDate>,
    pub invoice_number: u64,
    pub point_of_sale: u32,
    /// `A` approved, `R` rejected, `P` partial.
    pub status: String,
}

/// A previously authorised invoice as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueriedInvoice {
    pub invoice_type_code: u16,
    pub point_of_sale: u32,
    pub invoice_number: u64,
    pub cae: Option<String>,
    pub total_amount: Option<f64>,
    pub invoice_date: Option<NaiveDate>,
}

/// Highest authorised invoice number for a point of sale and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastInvoice {
    pub point_of_sale: u32,
    pub invoice_type_code: u16,
    pub invoice_number: u64,
}

/// A generic row from the service parameter tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub id: String,
    pub description: String,
}
