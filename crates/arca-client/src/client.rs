//! Per-company client facade.

use crate::config::ManagerConfig;
use crate::error::ClientError;
use crate::Result;
use arca_core::{CompanyCredentials, CompanyId, Cuit, Environment};
use arca_soap::SoapClient;
use arca_wsaa::{AuthService, SigningMaterial};
use arca_wsfe::WsfeService;
use arca_wsfex::WsfexService;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Read-only view of the company a client operates for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyInfo {
    pub company_id: CompanyId,
    pub cuit: Cuit,
    pub environment: Environment,
}

/// One company's access to the invoicing services.
///
/// Owns the authentication state (ticket cache) and one handle to each
/// business service; the handles share the auth service, so a ticket
/// acquired through one is visible to the other. A client is OPEN from
/// construction until [`close`](Self::close), after which every operation
/// fails with [`ClientError::Closed`].
pub struct CompanyClient {
    credentials: CompanyCredentials,
    auth: Arc<AuthService>,
    wsfe: WsfeService,
    wsfex: WsfexService,
    closed: AtomicBool,
}

impl CompanyClient {
    /// Parses the credential material and wires up the services.
    ///
    /// No network traffic happens here; the first ticket acquisition does
    /// the handshake.
    pub(crate) fn connect(
        credentials: CompanyCredentials,
        config: &ManagerConfig,
    ) -> Result<Self> {
        let material =
            SigningMaterial::from_credentials(&credentials).map_err(ClientError::create)?;
        let soap = SoapClient::new(config.http_timeout).map_err(ClientError::create)?;

        let environment = credentials.environment();
        let cuit = credentials.cuit().clone();

        let auth = Arc::new(AuthService::new(
            cuit.clone(),
            environment,
            material,
            soap.clone(),
        ));
        let wsfe = WsfeService::new(
            auth.clone(),
            soap.clone(),
            environment,
            &cuit,
            config.max_retry_attempts,
        );
        let wsfex = WsfexService::new(
            auth.clone(),
            soap,
            environment,
            &cuit,
            config.max_retry_attempts,
        );

        info!(company_id = %credentials.company_id(), "company client initialized");
        Ok(Self {
            credentials,
            auth,
            wsfe,
            wsfex,
            closed: AtomicBool::new(false),
        })
    }

    /// Domestic invoicing service handle.
    pub fn wsfe(&self) -> Result<&WsfeService> {
        self.ensure_open()?;
        Ok(&self.wsfe)
    }

    /// Export invoicing service handle.
    pub fn wsfex(&self) -> Result<&WsfexService> {
        self.ensure_open()?;
        Ok(&self.wsfex)
    }

    /// The company this client operates for.
    pub fn company_info(&self) -> Result<CompanyInfo> {
        self.ensure_open()?;
        Ok(CompanyInfo {
            company_id: self.credentials.company_id().clone(),
            cuit: self.credentials.cuit().clone(),
            environment: self.credentials.environment(),
        })
    }

    /// Probes the authentication path by acquiring a ticket for the
    /// domestic service. May populate the ticket cache; mutates nothing
    /// else.
    pub async fn is_healthy(&self) -> Result<()> {
        self.ensure_open()?;
        self.auth.get_ticket(arca_wsfe::SERVICE_KEY).await?;
        Ok(())
    }

    /// Closes the client and clears its ticket cache.
    ///
    /// Idempotent; only the first call has any effect. Does not wait for
    /// in-flight requests, which keep working on their already-acquired
    /// tickets.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.auth.clear_cache();
            info!(company_id = %self.credentials.company_id(), "company client closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of cached access tickets, for diagnostics.
    #[must_use]
    pub fn ticket_cache_size(&self) -> usize {
        self.auth.cache_size()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        Ok(())
    }
}
