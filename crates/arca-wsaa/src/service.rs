//! Ticket acquisition orchestration.

use crate::cms::sign_login_request;
use crate::keys::SigningMaterial;
use crate::login::LoginTicketRequest;
use crate::ticket::{AccessTicket, TicketCache, TICKET_VALIDITY};
use crate::transport::{LoginTransport, SoapLoginTransport};
use crate::Result;
use arca_core::{Cuit, Environment};
use arca_soap::SoapClient;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Supplies valid access tickets for `(company, service key)` pairs,
/// amortising the CMS sign-and-exchange behind a per-service cache.
///
/// Concurrent misses for the same service key may both run the exchange;
/// both succeed and the second insertion wins. The expensive path holds no
/// lock.
pub struct AuthService {
    cuit: Cuit,
    environment: Environment,
    material: SigningMaterial,
    transport: Arc<dyn LoginTransport>,
    cache: TicketCache,
}

impl AuthService {
    /// Builds a service over the production SOAP transport.
    #[must_use]
    pub fn new(
        cuit: Cuit,
        environment: Environment,
        material: SigningMaterial,
        soap: SoapClient,
    ) -> Self {
        let transport = SoapLoginTransport::new(soap, environment.wsaa_url());
        Self::with_transport(cuit, environment, material, Arc::new(transport))
    }

    /// Builds a service over an arbitrary transport; tests use this seam
    /// to count or fake exchanges.
    #[must_use]
    pub fn with_transport(
        cuit: Cuit,
        environment: Environment,
        material: SigningMaterial,
        transport: Arc<dyn LoginTransport>,
    ) -> Self {
        Self {
            cuit,
            environment,
            material,
            transport,
            cache: TicketCache::new(),
        }
    }

    /// Returns a fresh access ticket for `service`, from cache when
    /// possible, otherwise via a new signed login exchange.
    pub async fn get_ticket(&self, service: &str) -> Result<AccessTicket> {
        let now = Utc::now();

        if let Some(ticket) = self.cache.fresh(service, now) {
            debug!(service, "access ticket served from cache");
            return Ok(ticket);
        }

        // A stale entry stays readable for concurrent callers until this
        // writer-locked re-check removes it.
        self.cache.evict_stale(service, now);

        let request = LoginTicketRequest::new(&self.cuit, self.environment, service);
        let cms = sign_login_request(&request.to_xml(), &self.material)?;
        let credentials = self.transport.exchange(&cms).await?;

        let now = Utc::now();
        let ticket = AccessTicket {
            token: credentials.token,
            sign: credentials.sign,
            generation_time: now,
            // The endpoint guarantees 24 hours; the response's own expiry
            // attributes are not consulted.
            expiration_time: now + TICKET_VALIDITY,
        };
        self.cache.insert(service, ticket.clone());

        info!(service, "new access ticket acquired");
        Ok(ticket)
    }

    /// Drops every cached ticket.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("ticket cache cleared");
    }

    /// Number of cached tickets.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoginCredentials;
    use crate::WsaaError;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport stub that counts exchanges and mints tickets on demand.
    struct CountingTransport {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingTransport {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LoginTransport for CountingTransport {
        async fn exchange(&self, _cms_base64: &str) -> Result<LoginCredentials> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(WsaaError::InvalidResponse("stubbed failure".into()));
            }
            Ok(LoginCredentials {
                token: format!("token-{n}"),
                sign: format!("sign-{n}"),
            })
        }
    }

    fn service(transport: Arc<CountingTransport>) -> AuthService {
        AuthService::with_transport(
            Cuit::parse("20-26756539-3").unwrap(),
            Environment::Testing,
            crate::testutil::signing_material(),
            transport,
        )
    }

    #[tokio::test]
    async fn second_lookup_hits_the_cache() {
        let transport = Arc::new(CountingTransport::new());
        let auth = service(transport.clone());

        let first = auth.get_ticket("wsfe").await.unwrap();
        let second = auth.get_ticket("wsfe").await.unwrap();

        assert_eq!(transport.calls(), 1, "one exchange for two lookups");
        assert_eq!(first, second);
        assert_eq!(auth.cache_size(), 1);
    }

    #[tokio::test]
    async fn distinct_services_get_distinct_tickets() {
        let transport = Arc::new(CountingTransport::new());
        let auth = service(transport.clone());

        let fe = auth.get_ticket("wsfe").await.unwrap();
        let fex = auth.get_ticket("wsfex").await.unwrap();

        assert_eq!(transport.calls(), 2);
        assert_ne!(fe.token, fex.token);
        assert_eq!(auth.cache_size(), 2);
    }

    #[tokio::test]
    async fn ticket_inside_skew_window_triggers_reacquisition() {
        let transport = Arc::new(CountingTransport::new());
        let auth = service(transport.clone());

        let first = auth.get_ticket("wsfe").await.unwrap();
        assert_eq!(transport.calls(), 1);

        // Simulate a ticket with only four minutes of life left, inside
        // the five-minute skew.
        let mut short_lived = first;
        short_lived.expiration_time = Utc::now() + Duration::minutes(4);
        auth.cache.insert("wsfe", short_lived);

        let second = auth.get_ticket("wsfe").await.unwrap();
        assert_eq!(transport.calls(), 2, "stale ticket must be re-acquired");
        assert_eq!(second.token, "token-2");
    }

    #[tokio::test]
    async fn clear_cache_forces_new_exchange() {
        let transport = Arc::new(CountingTransport::new());
        let auth = service(transport.clone());

        auth.get_ticket("wsfe").await.unwrap();
        auth.clear_cache();
        assert_eq!(auth.cache_size(), 0);

        auth.get_ticket("wsfe").await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn exchange_failure_leaves_cache_empty() {
        let transport = Arc::new(CountingTransport::failing());
        let auth = service(transport.clone());

        let err = auth.get_ticket("wsfe").await.unwrap_err();
        assert!(matches!(err, WsaaError::InvalidResponse(_)));
        assert_eq!(auth.cache_size(), 0);
    }

    #[tokio::test]
    async fn returned_tickets_are_fresh() {
        let transport = Arc::new(CountingTransport::new());
        let auth = service(transport);

        let ticket = auth.get_ticket("wsfe").await.unwrap();
        assert!(ticket.is_fresh(Utc::now()));
        assert!(ticket.expiration_time > ticket.generation_time);
    }
}
