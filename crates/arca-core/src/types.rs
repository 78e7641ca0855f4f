//! Invoice vocabulary shared by the domestic and export services.
//!
//! Numeric codes follow the ARCA parameter tables.

use serde::{Deserialize, Serialize};

/// Identity document types accepted on invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum DocumentType {
    Dni = 1,
    Cuit = 11,
    Cuil = 12,
    Cdi = 13,
    /// Libreta de enrolamiento.
    Le = 14,
    /// Libreta cívica.
    Lc = 15,
    /// Cédula de identidad.
    Ci = 16,
    Passport = 17,
    /// Documento extranjero.
    De = 18,
    /// Documento de identidad.
    Di = 19,
}

impl DocumentType {
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Invoice concept: what the invoice covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ConceptType {
    Products = 1,
    Services = 2,
    Mixed = 3,
}

impl ConceptType {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Invoice (comprobante) types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum InvoiceType {
    FacturaA = 1,
    FacturaB = 6,
    FacturaC = 11,
    FacturaE = 19,
    FacturaM = 51,
}

impl InvoiceType {
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Currency identifiers accepted on invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyType {
    #[serde(rename = "PES")]
    Peso,
    #[serde(rename = "USD")]
    Dollar,
    #[serde(rename = "EUR")]
    Euro,
    #[serde(rename = "BRL")]
    Real,
}

impl CurrencyType {
    /// The wire identifier for the currency.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            CurrencyType::Peso => "PES",
            CurrencyType::Dollar => "USD",
            CurrencyType::Euro => "EUR",
            CurrencyType::Real => "BRL",
        }
    }
}

/// A currency row from a parameter lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_codes_match_parameter_table() {
        assert_eq!(DocumentType::Dni.code(), 1);
        assert_eq!(DocumentType::Cuit.code(), 11);
        assert_eq!(DocumentType::Cuil.code(), 12);
        assert_eq!(DocumentType::Passport.code(), 17);
    }

    #[test]
    fn currency_wire_ids() {
        assert_eq!(CurrencyType::Peso.id(), "PES");
        assert_eq!(CurrencyType::Dollar.id(), "USD");
        assert_eq!(CurrencyType::Euro.id(), "EUR");
        assert_eq!(CurrencyType::Real.id(), "BRL");
    }
}
