//! CMS (PKCS#7) signing of login ticket requests.
//!
//! The authentication endpoint accepts exactly one algorithm pair: RSA
//! with a SHA-1 digest. The one-shot PKCS#7 signing entry point offers no
//! digest parameter and follows the library default, so the `SignedData`
//! envelope is assembled field by field here with the digest pinned.

use crate::keys::SigningMaterial;
use crate::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use openssl::hash::MessageDigest;
use openssl::sign::Signer;

/// 1.2.840.113549.1.7.2 (pkcs7-signedData)
const OID_SIGNED_DATA: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02];
/// 1.2.840.113549.1.7.1 (pkcs7-data)
const OID_DATA: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x01];
/// 1.3.14.3.2.26 (sha1)
const OID_SHA1: &[u8] = &[0x2b, 0x0e, 0x03, 0x02, 0x1a];
/// 1.2.840.113549.1.1.1 (rsaEncryption)
const OID_RSA_ENCRYPTION: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

/// Signs the login XML into a PKCS#7 `SignedData` envelope and returns it
/// base64-encoded, as expected inside the `in0` element of the `loginCms`
/// SOAP call.
///
/// The envelope carries the XML as signed content, the company certificate
/// in the certificate set, and one `SignerInfo` referencing the
/// certificate's issuer and serial, with an RSA-SHA1 signature over the
/// content bytes.
pub fn sign_login_request(xml: &str, material: &SigningMaterial) -> Result<String> {
    let der = build_signed_data(xml.as_bytes(), material)?;
    Ok(STANDARD.encode(der))
}

/// Assembles the `ContentInfo { signedData }` DER structure.
fn build_signed_data(content: &[u8], material: &SigningMaterial) -> Result<Vec<u8>> {
    let cert = material.certificate();

    let mut signer = Signer::new(MessageDigest::sha1(), material.private_key())?;
    signer.update(content)?;
    let signature = signer.sign_to_vec()?;

    let sha1_alg = sequence(&[oid(OID_SHA1), null()]);
    let rsa_alg = sequence(&[oid(OID_RSA_ENCRYPTION), null()]);

    // SignerInfo with no authenticated attributes: the signature covers
    // the content bytes directly.
    let issuer_and_serial = sequence(&[
        cert.issuer_name().to_der()?,
        integer(&cert.serial_number().to_bn()?.to_vec()),
    ]);
    let signer_info = sequence(&[
        integer(&[1]),
        issuer_and_serial,
        sha1_alg.clone(),
        rsa_alg,
        octet_string(&signature),
    ]);

    let signed_data = sequence(&[
        integer(&[1]),
        set(&[sha1_alg]),
        sequence(&[oid(OID_DATA), context(0, &octet_string(content))]),
        // [0] IMPLICIT certificate set, carrying the signer certificate.
        context(0, &cert.to_der()?),
        set(&[signer_info]),
    ]);

    Ok(sequence(&[oid(OID_SIGNED_DATA), context(0, &signed_data)]))
}

/// DER tag-length-value with definite length encoding.
fn tlv(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 6);
    out.push(tag);
    let len = body.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
        out.push(0x80 | (bytes.len() - first) as u8);
        out.extend_from_slice(&bytes[first..]);
    }
    out.extend_from_slice(body);
    out
}

fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

fn sequence(parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(0x30, &concat(parts))
}

fn set(parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(0x31, &concat(parts))
}

fn oid(body: &[u8]) -> Vec<u8> {
    tlv(0x06, body)
}

fn null() -> Vec<u8> {
    vec![0x05, 0x00]
}

fn octet_string(body: &[u8]) -> Vec<u8> {
    tlv(0x04, body)
}

/// Context-specific constructed tag `[n]`.
fn context(n: u8, body: &[u8]) -> Vec<u8> {
    tlv(0xa0 | n, body)
}

/// DER INTEGER from unsigned big-endian magnitude bytes.
fn integer(magnitude: &[u8]) -> Vec<u8> {
    let stripped: &[u8] = {
        let start = magnitude.iter().position(|&b| b != 0).unwrap_or(magnitude.len());
        &magnitude[start..]
    };
    let mut body = Vec::with_capacity(stripped.len() + 1);
    if stripped.is_empty() {
        body.push(0);
    } else {
        if stripped[0] & 0x80 != 0 {
            body.push(0);
        }
        body.extend_from_slice(stripped);
    }
    tlv(0x02, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
    use openssl::stack::Stack;
    use openssl::x509::store::X509StoreBuilder;
    use openssl::x509::X509;

    #[test]
    fn produces_base64_der_pkcs7() {
        let material = testutil::signing_material();
        let encoded = sign_login_request("<loginTicketRequest/>", &material).unwrap();

        let der = STANDARD.decode(encoded).unwrap();
        // Round-trips through an independent PKCS#7 parse.
        let parsed = Pkcs7::from_der(&der).unwrap();
        assert!(parsed.signed().is_some());
    }

    #[test]
    fn signature_verifies_and_content_round_trips() {
        let material = testutil::signing_material();
        let xml = "<loginTicketRequest version=\"1.0\"/>";
        let encoded = sign_login_request(xml, &material).unwrap();

        let der = STANDARD.decode(encoded).unwrap();
        let pkcs7 = Pkcs7::from_der(&der).unwrap();

        // NOVERIFY skips chain building for the self-signed test
        // certificate; the content signature itself is still checked.
        let certs: Stack<X509> = Stack::new().unwrap();
        let store = X509StoreBuilder::new().unwrap().build();
        let mut content = Vec::new();
        pkcs7
            .verify(&certs, &store, None, Some(&mut content), Pkcs7Flags::NOVERIFY)
            .unwrap();
        assert_eq!(content, xml.as_bytes());
    }

    #[test]
    fn digest_algorithm_is_sha1() {
        let material = testutil::signing_material();
        let encoded = sign_login_request("<a/>", &material).unwrap();
        let der = STANDARD.decode(encoded).unwrap();

        let sha1 = oid(OID_SHA1);
        assert!(
            der.windows(sha1.len()).any(|w| w == sha1.as_slice()),
            "envelope must declare the SHA-1 digest algorithm"
        );
    }

    #[test]
    fn distinct_content_signs_differently() {
        let material = testutil::signing_material();
        let a = sign_login_request("<a/>", &material).unwrap();
        let b = sign_login_request("<b/>", &material).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn der_integer_encoding() {
        assert_eq!(integer(&[]), vec![0x02, 0x01, 0x00]);
        assert_eq!(integer(&[0x00]), vec![0x02, 0x01, 0x00]);
        assert_eq!(integer(&[0x01]), vec![0x02, 0x01, 0x01]);
        // High bit set requires a leading zero octet.
        assert_eq!(integer(&[0x80]), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(integer(&[0x00, 0x7f]), vec![0x02, 0x01, 0x7f]);
    }

    #[test]
    fn der_long_form_length() {
        let body = vec![0u8; 300];
        let encoded = tlv(0x04, &body);
        assert_eq!(&encoded[..4], &[0x04, 0x82, 0x01, 0x2c]);
        assert_eq!(encoded.len(), 4 + 300);
    }
}
