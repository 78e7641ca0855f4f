//! Credential parsing into usable signing material.

use crate::{Result, WsaaError};
use arca_core::CompanyCredentials;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::X509;

/// Parsed certificate and private key, ready for CMS signing.
///
/// Accepts the certificate as X.509 PEM or DER, and the key as PEM (PKCS#1
/// or PKCS#8) or DER (PKCS#8, falling back to PKCS#1). Only RSA keys are
/// accepted; the remote service fixes the algorithm.
#[derive(Debug)]
pub struct SigningMaterial {
    certificate: X509,
    private_key: PKey<Private>,
}

impl SigningMaterial {
    /// Parses the raw credential bytes.
    pub fn from_credentials(creds: &CompanyCredentials) -> Result<Self> {
        let certificate = parse_certificate(creds.certificate())?;
        let private_key = parse_private_key(creds.private_key())?;

        if private_key.rsa().is_err() {
            return Err(WsaaError::Credentials(
                "private key is not RSA".to_string(),
            ));
        }

        Ok(Self {
            certificate,
            private_key,
        })
    }

    #[must_use]
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    #[must_use]
    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }
}

fn parse_certificate(bytes: &[u8]) -> Result<X509> {
    X509::from_pem(bytes)
        .or_else(|_| X509::from_der(bytes))
        .map_err(|e| WsaaError::Credentials(format!("cannot parse certificate: {e}")))
}

fn parse_private_key(bytes: &[u8]) -> Result<PKey<Private>> {
    if let Ok(key) = PKey::private_key_from_pem(bytes) {
        return Ok(key);
    }
    if let Ok(key) = PKey::private_key_from_der(bytes) {
        return Ok(key);
    }
    // PKCS#1 DER is not covered by the generic entry points.
    Rsa::private_key_from_der(bytes)
        .and_then(PKey::from_rsa)
        .map_err(|e| WsaaError::Credentials(format!("cannot parse private key: {e}")))
}
