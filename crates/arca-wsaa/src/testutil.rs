//! Shared helpers for the crate's tests: throwaway company credentials
//! backed by a freshly minted RSA key and self-signed certificate.

use crate::keys::SigningMaterial;
use arca_core::{CompanyCredentials, CompanyId, Cuit, Environment};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509Builder, X509NameBuilder};

/// Mints a self-signed certificate for a fresh 2048-bit RSA key.
pub(crate) fn self_signed() -> (Vec<u8>, PKey<Private>) {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "test company").unwrap();
    let name = name.build();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    let serial = serial.to_asn1_integer().unwrap();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    (builder.build().to_pem().unwrap(), key)
}

/// Credentials for a throwaway test company, key material in PEM.
pub(crate) fn credentials() -> CompanyCredentials {
    let (cert_pem, key) = self_signed();
    CompanyCredentials::new(
        CompanyId::new("test").unwrap(),
        Cuit::parse("20-26756539-3").unwrap(),
        Environment::Testing,
        cert_pem,
        key.private_key_to_pem_pkcs8().unwrap(),
    )
    .unwrap()
}

/// Ready-to-use signing material for a throwaway test company.
pub(crate) fn signing_material() -> SigningMaterial {
    SigningMaterial::from_credentials(&credentials()).unwrap()
}
