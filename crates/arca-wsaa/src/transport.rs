//! The signed login exchange with the authentication endpoint.

use crate::{Result, WsaaError};
use arca_soap::{text_of, SoapClient};
use async_trait::async_trait;

const LOGIN_NAMESPACE: &str = "http://wsaa.view.sua.dvadac.desein.afip.gov";
const LOGIN_ACTION: &str = "http://wsaa.view.sua.dvadac.desein.afip.gov/loginCms";

/// The credential pair extracted from a login ticket response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub token: String,
    pub sign: String,
}

/// Seam between ticket orchestration and the wire.
///
/// Production uses [`SoapLoginTransport`]; tests substitute counting or
/// canned implementations.
#[async_trait]
pub trait LoginTransport: Send + Sync {
    /// Exchanges a base64 CMS envelope for login credentials.
    async fn exchange(&self, cms_base64: &str) -> Result<LoginCredentials>;
}

/// SOAP 1.1 implementation of the login exchange.
pub struct SoapLoginTransport {
    soap: SoapClient,
    url: String,
}

impl SoapLoginTransport {
    #[must_use]
    pub fn new(soap: SoapClient, url: String) -> Self {
        Self { soap, url }
    }

    fn request_body(cms_base64: &str) -> String {
        let mut body = String::with_capacity(cms_base64.len() + 128);
        body.push_str(r#"<wsaa:loginCms xmlns:wsaa=""#);
        body.push_str(LOGIN_NAMESPACE);
        body.push_str(r#""><wsaa:in0>"#);
        body.push_str(cms_base64);
        body.push_str("</wsaa:in0></wsaa:loginCms>");
        body
    }
}

#[async_trait]
impl LoginTransport for SoapLoginTransport {
    async fn exchange(&self, cms_base64: &str) -> Result<LoginCredentials> {
        let body = Self::request_body(cms_base64);
        let response = self.soap.call(&self.url, LOGIN_ACTION, &body).await?;

        // The SOAP body carries the ticket response as an escaped inner
        // document inside loginCmsReturn.
        let inner = text_of(&response, "loginCmsReturn").ok_or_else(|| {
            WsaaError::InvalidResponse("missing loginCmsReturn".to_string())
        })?;

        parse_ticket_response(&inner)
    }
}

/// Pulls the credential pair out of a `loginTicketResponse` document.
pub(crate) fn parse_ticket_response(xml: &str) -> Result<LoginCredentials> {
    let token = text_of(xml, "token")
        .ok_or_else(|| WsaaError::InvalidResponse("missing credentials/token".to_string()))?;
    let sign = text_of(xml, "sign")
        .ok_or_else(|| WsaaError::InvalidResponse("missing credentials/sign".to_string()))?;
    Ok(LoginCredentials { token, sign })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ticket_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <loginTicketResponse version="1.0">
                <header>
                    <source>cn=wsaahomo</source>
                    <destination>SERIALNUMBER=CUIT 20267565393</destination>
                    <uniqueId>3774719106</uniqueId>
                    <generationTime>2024-05-01T12:00:00.000-03:00</generationTime>
                    <expirationTime>2024-05-01T24:00:00.000-03:00</expirationTime>
                </header>
                <credentials>
                    <token>PD94bWwg</token>
                    <sign>bWFyY2Vsbw==</sign>
                </credentials>
            </loginTicketResponse>"#;
        let creds = parse_ticket_response(xml).unwrap();
        assert_eq!(creds.token, "PD94bWwg");
        assert_eq!(creds.sign, "bWFyY2Vsbw==");
    }

    #[test]
    fn missing_credentials_is_invalid_response() {
        let err = parse_ticket_response("<loginTicketResponse/>").unwrap_err();
        assert!(matches!(err, WsaaError::InvalidResponse(_)));
    }

    #[test]
    fn request_body_embeds_cms() {
        let body = SoapLoginTransport::request_body("QUJD");
        assert!(body.contains("<wsaa:in0>QUJD</wsaa:in0>"));
        assert!(body.contains(LOGIN_NAMESPACE));
    }
}
