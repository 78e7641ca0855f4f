//! HTTP transport for SOAP 1.1 calls.

use crate::xml::{envelope, text_of};
use crate::{Result, SoapError};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("arca-invoice/", env!("CARGO_PKG_VERSION"));

/// Delay between retry attempts in [`SoapClient::call_with_retry`].
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Thin SOAP 1.1 client over a pooled `reqwest::Client`.
///
/// The underlying connection pool and TLS configuration are fixed at
/// construction and shared by every call.
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: reqwest::Client,
}

impl SoapClient {
    /// Builds a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SoapError::Connection {
                url: String::new(),
                source: e,
            })?;
        Ok(Self { http })
    }

    /// Posts `body` (a body fragment, enveloped here) and returns the raw
    /// response text after status and fault checks.
    pub async fn call(&self, url: &str, soap_action: &str, body: &str) -> Result<String> {
        let payload = envelope(body);
        debug!(url, soap_action, "SOAP request");

        let response = self
            .http
            .post(url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(payload)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SoapError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| classify(url, e))?;
        debug!(url, bytes = text.len(), "SOAP response");

        if let Some(fault) = find_fault(&text) {
            return Err(fault);
        }

        Ok(text)
    }

    /// Like [`call`](Self::call), retrying transient failures.
    ///
    /// `max_attempts` counts the total number of tries; zero is treated as
    /// one. Faults and malformed responses are never retried.
    pub async fn call_with_retry(
        &self,
        url: &str,
        soap_action: &str,
        body: &str,
        max_attempts: u32,
    ) -> Result<String> {
        let attempts = max_attempts.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            match self.call(url, soap_action, body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(url, attempt, error = %e, "transient SOAP failure, retrying");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // Unreachable with attempts >= 1, but keeps the compiler honest.
        Err(last_err.unwrap_or(SoapError::InvalidResponse("no attempts made".into())))
    }
}

/// Maps a reqwest failure onto the transport error taxonomy.
fn classify(url: &str, e: reqwest::Error) -> SoapError {
    if e.is_timeout() {
        SoapError::TimedOut {
            url: url.to_string(),
        }
    } else {
        SoapError::Connection {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Detects a SOAP `Fault` element in a response body.
fn find_fault(xml: &str) -> Option<SoapError> {
    // Cheap pre-check keeps the parser off the happy path.
    if !xml.contains("Fault") {
        return None;
    }
    let code = text_of(xml, "faultcode")?;
    let message = text_of(xml, "faultstring").unwrap_or_default();
    Some(SoapError::Fault { code, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_detection() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
            <soapenv:Body><soapenv:Fault>
                <faultcode>ns1:cms.bad</faultcode>
                <faultstring>CMS no es valido</faultstring>
            </soapenv:Fault></soapenv:Body></soapenv:Envelope>"#;
        match find_fault(xml) {
            Some(SoapError::Fault { code, message }) => {
                assert_eq!(code, "ns1:cms.bad");
                assert_eq!(message, "CMS no es valido");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn no_fault_in_clean_response() {
        let xml = "<Envelope><Body><ok/></Body></Envelope>";
        assert!(find_fault(xml).is_none());
    }
}
