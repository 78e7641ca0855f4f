//! CUIT fiscal identifier parsing and check-digit validation.

use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static CUIT_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{8}-\d$").expect("valid CUIT pattern"));

/// Weights applied to the ten leading digits for the mod-11 check digit.
const CHECK_WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

/// Prefixes for which a remainder of 1 maps to check digit 9.
const REMAINDER_ONE_PREFIXES: [&str; 7] = ["20", "23", "24", "27", "30", "33", "34"];

/// A validated CUIT (Clave Única de Identificación Tributaria).
///
/// Stored in its canonical dashed form `DD-DDDDDDDD-D`. Construction
/// enforces both the format and the mod-11 check digit, so a `Cuit` value
/// is always well-formed.
///
/// # Example
///
/// ```
/// use arca_core::Cuit;
///
/// let cuit: Cuit = "20-26756539-3".parse().unwrap();
/// assert_eq!(cuit.digits(), "20267565393");
/// assert!("20-12345678-9".parse::<Cuit>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cuit(String);

impl Cuit {
    /// Parses and validates a CUIT in `DD-DDDDDDDD-D` form.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.is_empty() {
            return Err(ValidationError::new("cuit", "must not be empty"));
        }
        if !CUIT_FORMAT.is_match(input) {
            return Err(ValidationError::new(
                "cuit",
                "must match the format DD-DDDDDDDD-D",
            ));
        }
        if !check_digit_valid(input) {
            return Err(ValidationError::new("cuit", "check digit mismatch"));
        }
        Ok(Self(input.to_string()))
    }

    /// The canonical dashed representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare 11 digits, as transmitted in service auth blocks.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

impl Display for Cuit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cuit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Verifies the mod-11 check digit over the ten leading digits.
fn check_digit_valid(cuit: &str) -> bool {
    let digits: Vec<u32> = cuit
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != 11 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .take(10)
        .zip(CHECK_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();

    let expected = match sum % 11 {
        0 => 0,
        1 => {
            let prefix = &cuit[..2];
            if REMAINDER_ONE_PREFIXES.contains(&prefix) {
                9
            } else {
                0
            }
        }
        r => 11 - r,
    };

    digits[10] == expected
}
