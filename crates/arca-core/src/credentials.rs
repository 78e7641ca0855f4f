//! Immutable per-company credentials.

use crate::error::ValidationError;
use crate::{CompanyId, Cuit, Environment};

/// Everything needed to operate on behalf of one company.
///
/// Immutable once constructed; a client manager derives a long-lived client
/// from a credential set and keeps only read access to it. Certificate and
/// key bytes are accepted in DER or PEM (keys in PKCS#1 or PKCS#8) and are
/// parsed lazily by the authentication layer, so a malformed certificate
/// surfaces on first use rather than here.
#[derive(Debug, Clone)]
pub struct CompanyCredentials {
    company_id: CompanyId,
    cuit: Cuit,
    environment: Environment,
    certificate: Vec<u8>,
    private_key: Vec<u8>,
}

impl CompanyCredentials {
    /// Builds a credential set, rejecting empty key material.
    pub fn new(
        company_id: CompanyId,
        cuit: Cuit,
        environment: Environment,
        certificate: Vec<u8>,
        private_key: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        if certificate.is_empty() {
            return Err(ValidationError::new("certificate", "must not be empty"));
        }
        if private_key.is_empty() {
            return Err(ValidationError::new("private_key", "must not be empty"));
        }
        Ok(Self {
            company_id,
            cuit,
            environment,
            certificate,
            private_key,
        })
    }

    #[must_use]
    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    #[must_use]
    pub fn cuit(&self) -> &Cuit {
        &self.cuit
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// X.509 certificate bytes, DER or PEM.
    #[must_use]
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// RSA private key bytes, PKCS#1 or PKCS#8, DER or PEM.
    #[must_use]
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (CompanyId, Cuit) {
        (
            CompanyId::new("acme").unwrap(),
            Cuit::parse("20-26756539-3").unwrap(),
        )
    }

    #[test]
    fn accepts_complete_credentials() {
        let (id, cuit) = sample();
        let creds = CompanyCredentials::new(
            id,
            cuit,
            Environment::Testing,
            b"cert".to_vec(),
            b"key".to_vec(),
        )
        .unwrap();
        assert_eq!(creds.company_id().as_str(), "acme");
        assert_eq!(creds.environment(), Environment::Testing);
    }

    #[test]
    fn rejects_empty_certificate() {
        let (id, cuit) = sample();
        let err = CompanyCredentials::new(id, cuit, Environment::Testing, vec![], b"key".to_vec())
            .unwrap_err();
        assert_eq!(err.field, "certificate");
    }

    #[test]
    fn rejects_empty_private_key() {
        let (id, cuit) = sample();
        let err = CompanyCredentials::new(id, cuit, Environment::Testing, b"cert".to_vec(), vec![])
            .unwrap_err();
        assert_eq!(err.field, "private_key");
    }
}
