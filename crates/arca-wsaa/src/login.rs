//! Login ticket request construction.

use arca_core::{Cuit, Environment};
use arca_soap::xml_escape;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Timestamp format required by the authentication endpoint: millisecond
/// precision with an explicit offset, e.g. `2024-05-01T12:00:00.000+00:00`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Requested ticket lifetime carried in the request header.
const REQUEST_VALIDITY_HOURS: i64 = 24;

/// A `loginTicketRequest` document ready for signing.
#[derive(Debug, Clone)]
pub struct LoginTicketRequest {
    source: String,
    destination: String,
    unique_id: String,
    generation_time: DateTime<Utc>,
    expiration_time: DateTime<Utc>,
    service: String,
}

impl LoginTicketRequest {
    /// Builds a request for the given service key, stamped with the current
    /// time and a fresh 128-bit random `uniqueId`.
    #[must_use]
    pub fn new(cuit: &Cuit, environment: Environment, service: &str) -> Self {
        Self::at(cuit, environment, service, Utc::now())
    }

    /// Builds a request with an explicit generation time.
    #[must_use]
    pub fn at(cuit: &Cuit, environment: Environment, service: &str, now: DateTime<Utc>) -> Self {
        Self {
            source: cuit.to_string(),
            destination: environment.login_destination().to_string(),
            unique_id: Uuid::new_v4().simple().to_string(),
            generation_time: now,
            expiration_time: now + Duration::hours(REQUEST_VALIDITY_HOURS),
            service: service.to_string(),
        }
    }

    /// The random request identifier, 32 lowercase hex characters.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Serialises the request to its XML document form.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<loginTicketRequest version="1.0">"#);
        xml.push_str("<header>");
        xml.push_str("<source>");
        xml.push_str(&xml_escape(&self.source));
        xml.push_str("</source>");
        xml.push_str("<destination>");
        xml.push_str(&xml_escape(&self.destination));
        xml.push_str("</destination>");
        xml.push_str("<uniqueId>");
        xml.push_str(&self.unique_id);
        xml.push_str("</uniqueId>");
        xml.push_str("<generationTime>");
        xml.push_str(&self.generation_time.format(TIMESTAMP_FORMAT).to_string());
        xml.push_str("</generationTime>");
        xml.push_str("<expirationTime>");
        xml.push_str(&self.expiration_time.format(TIMESTAMP_FORMAT).to_string());
        xml.push_str("</expirationTime>");
        xml.push_str("</header>");
        xml.push_str("<service>");
        xml.push_str(&xml_escape(&self.service));
        xml.push_str("</service>");
        xml.push_str("</loginTicketRequest>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cuit() -> Cuit {
        Cuit::parse("20-26756539-3").unwrap()
    }

    #[test]
    fn xml_carries_all_header_fields() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let req = LoginTicketRequest::at(&cuit(), Environment::Testing, "wsfe", now);
        let xml = req.to_xml();

        assert!(xml.contains("<source>20-26756539-3</source>"));
        assert!(xml.contains("<destination>cn=wsaahomo,o=afip,c=ar,serialNumber=CUIT 33693450239</destination>"));
        assert!(xml.contains("<generationTime>2024-05-01T12:00:00.000+00:00</generationTime>"));
        assert!(xml.contains("<expirationTime>2024-05-02T12:00:00.000+00:00</expirationTime>"));
        assert!(xml.contains("<service>wsfe</service>"));
    }

    #[test]
    fn unique_id_is_32_hex_chars() {
        let req = LoginTicketRequest::new(&cuit(), Environment::Testing, "wsfe");
        let id = req.unique_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn unique_ids_do_not_repeat() {
        let a = LoginTicketRequest::new(&cuit(), Environment::Testing, "wsfe");
        let b = LoginTicketRequest::new(&cuit(), Environment::Testing, "wsfe");
        assert_ne!(a.unique_id(), b.unique_id());
    }

    #[test]
    fn production_destination_differs() {
        let req = LoginTicketRequest::new(&cuit(), Environment::Production, "wsfex");
        assert!(req.to_xml().contains("cn=wsaa,o=afip,c=ar"));
    }

    #[test]
    fn service_key_is_escaped() {
        let req = LoginTicketRequest::new(&cuit(), Environment::Testing, "a<b");
        assert!(req.to_xml().contains("<service>a&lt;b</service>"));
    }
}
