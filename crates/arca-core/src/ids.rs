//! Strongly typed company identifier.
//!
//! The newtype prevents a company id from being confused with the other
//! opaque strings (CUITs, service keys, tokens) that travel through the
//! client, and guarantees non-emptiness at construction time.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Opaque identifier for a company (tenant) within a client manager.
///
/// Any non-empty string is a valid identifier; the library attaches no
/// meaning to its contents beyond equality.
///
/// # Example
///
/// ```
/// use arca_core::CompanyId;
///
/// let id: CompanyId = "acme-sa".parse().unwrap();
/// assert_eq!(id.as_str(), "acme-sa");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    /// Creates an identifier, rejecting empty input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::new("company_id", "must not be empty"));
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CompanyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompanyId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_empty() {
        let id = CompanyId::new("empresa-1").unwrap();
        assert_eq!(id.to_string(), "empresa-1");
    }

    #[test]
    fn rejects_empty() {
        let err = CompanyId::new("").unwrap_err();
        assert_eq!(err.field, "company_id");
    }

    #[test]
    fn usable_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(CompanyId::new("a").unwrap(), 1);
        assert_eq!(map.get(&CompanyId::new("a").unwrap()), Some(&1));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CompanyId::new("acme").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"acme\"");
    }
}
