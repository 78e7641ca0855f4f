//! ARCA environments and their fixed service endpoints.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::ValidationError;

/// Target ARCA environment.
///
/// Endpoint URLs and the WSAA login destination are fixed per environment;
/// there is no way to point a client at an arbitrary host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Homologation (test) environment.
    Testing,
    /// Production environment.
    Production,
}

impl Environment {
    /// Base URL of the environment.
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Testing => "https://wswhomo.afip.gov.ar",
            Environment::Production => "https://servicios1.afip.gov.ar",
        }
    }

    /// WSAA authentication endpoint.
    #[must_use]
    pub fn wsaa_url(self) -> String {
        format!("{}/ws/services/LoginCms", self.base_url())
    }

    /// WSFEv1 domestic invoicing endpoint.
    #[must_use]
    pub fn wsfe_url(self) -> String {
        format!("{}/wsfev1/service.asmx", self.base_url())
    }

    /// WSFEXv1 export invoicing endpoint.
    #[must_use]
    pub fn wsfex_url(self) -> String {
        format!("{}/wsfexv1/service.asmx", self.base_url())
    }

    /// Distinguished name of the WSAA login destination for this environment.
    #[must_use]
    pub fn login_destination(self) -> &'static str {
        match self {
            Environment::Testing => "cn=wsaahomo,o=afip,c=ar,serialNumber=CUIT 33693450239",
            Environment::Production => "cn=wsaa,o=afip,c=ar,serialNumber=CUIT 33693450239",
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Testing => write!(f, "testing"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testing" => Ok(Environment::Testing),
            "production" => Ok(Environment::Production),
            other => Err(ValidationError::new(
                "environment",
                format!("must be 'testing' or 'production', got '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testing_urls() {
        let env = Environment::Testing;
        assert_eq!(env.base_url(), "https://wswhomo.afip.gov.ar");
        assert_eq!(env.wsaa_url(), "https://wswhomo.afip.gov.ar/ws/services/LoginCms");
        assert_eq!(env.wsfe_url(), "https://wswhomo.afip.gov.ar/wsfev1/service.asmx");
        assert_eq!(env.wsfex_url(), "https://wswhomo.afip.gov.ar/wsfexv1/service.asmx");
    }

    #[test]
    fn production_urls() {
        let env = Environment::Production;
        assert_eq!(env.base_url(), "https://servicios1.afip.gov.ar");
        assert_eq!(env.wsaa_url(), "https://servicios1.afip.gov.ar/ws/services/LoginCms");
    }

    #[test]
    fn destination_differs_per_environment() {
        assert!(Environment::Testing.login_destination().contains("wsaahomo"));
        assert!(!Environment::Production.login_destination().contains("wsaahomo"));
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("testing".parse::<Environment>().unwrap(), Environment::Testing);
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }
}
