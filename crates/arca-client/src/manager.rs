//! Bounded multi-tenant client cache.

use crate::client::CompanyClient;
use crate::config::ManagerConfig;
use crate::Result;
use arca_core::{CompanyCredentials, CompanyId, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cache occupancy snapshot, produced on demand by
/// [`ClientManager::stats`].
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Clients currently cached.
    pub total: usize,
    /// Clients used within the idle window.
    pub active: usize,
    /// Clients outside the idle window, pending lazy eviction.
    pub inactive: usize,
    /// When the last explicit cleanup pass ran.
    pub last_cleanup: Option<DateTime<Utc>>,
    /// The idle window the counts were measured against.
    pub idle_timeout: Duration,
}

/// A cached client with recency bookkeeping.
///
/// `last_used` is milliseconds since the manager's start instant, stored
/// atomically so the read path can bump it without taking the writer lock.
struct CacheNode {
    client: Arc<CompanyClient>,
    created_at: Instant,
    last_used: AtomicU64,
}

impl CacheNode {
    fn new(client: Arc<CompanyClient>, now_millis: u64) -> Self {
        Self {
            client,
            created_at: Instant::now(),
            last_used: AtomicU64::new(now_millis),
        }
    }

    fn touch(&self, now_millis: u64) {
        self.last_used.store(now_millis, Ordering::Release);
    }

    fn last_used_millis(&self) -> u64 {
        self.last_used.load(Ordering::Acquire)
    }

    fn idle_for(&self, now_millis: u64) -> Duration {
        Duration::from_millis(now_millis.saturating_sub(self.last_used_millis()))
    }
}

/// Hands out one [`CompanyClient`] per company, amortising construction
/// behind a bounded cache.
///
/// Eviction policy: least-recently-used on the insert path when the cache
/// is full; idle-based eviction lazily on access and eagerly via
/// [`cleanup_inactive`](Self::cleanup_inactive). Every evicted client is
/// closed before its slot can be reused, so at most one open client per
/// company id is ever observable.
///
/// All methods are safe to call from many threads; no lock is held during
/// client construction or any network I/O.
pub struct ClientManager {
    config: ManagerConfig,
    start: Instant,
    cache: RwLock<HashMap<CompanyId, CacheNode>>,
    /// Serialises cleanup passes so two sweeps cannot interleave.
    cleanup_lock: Mutex<()>,
    last_cleanup: RwLock<Option<DateTime<Utc>>>,
}

impl ClientManager {
    /// Creates a manager with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration fails [`ManagerConfig::validate`]; use
    /// [`try_new`](Self::try_new) to handle that as an error.
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        Self::try_new(config).expect("invalid manager configuration")
    }

    /// Creates a manager, surfacing configuration errors.
    pub fn try_new(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            start: Instant::now(),
            cache: RwLock::new(HashMap::new()),
            cleanup_lock: Mutex::new(()),
            last_cleanup: RwLock::new(None),
        })
    }

    /// Returns the cached client for the company, or constructs one.
    ///
    /// The fast path runs under the reader lock and bumps the entry's
    /// recency. A stale entry is observed read-only, then evicted under
    /// the writer lock (after a re-check) before the replacement is
    /// inserted. Construction happens outside all locks; when two callers
    /// race, the loser closes its own instance and returns the winner's.
    pub fn get_client(&self, credentials: &CompanyCredentials) -> Result<Arc<CompanyClient>> {
        self.validate_credentials(credentials)?;

        let company_id = credentials.company_id();
        let now = self.now_millis();

        {
            let cache = self.cache.read().expect("client cache poisoned");
            if let Some(node) = cache.get(company_id) {
                if node.idle_for(now) <= self.config.client_idle_timeout {
                    node.touch(now);
                    debug!(company_id = %company_id, "client served from cache");
                    return Ok(node.client.clone());
                }
                // Stale: fall through to the writer path without mutating.
            }
        }

        let fresh = Arc::new(CompanyClient::connect(credentials.clone(), &self.config)?);

        let mut cache = self.cache.write().expect("client cache poisoned");
        let now = self.now_millis();

        // Re-check under the writer lock: another caller may have inserted
        // a fresh entry, or the stale one may already be gone.
        let winner = cache.get(company_id).and_then(|node| {
            (node.idle_for(now) <= self.config.client_idle_timeout).then(|| {
                node.touch(now);
                node.client.clone()
            })
        });
        if let Some(winner) = winner {
            // Another caller won the race; our instance never escaped.
            fresh.close();
            return Ok(winner);
        }
        if let Some(stale) = cache.remove(company_id) {
            self.close_client(company_id, &stale.client, "idle eviction");
        }

        if cache.len() >= self.config.max_cached_clients {
            self.evict_lru(&mut cache);
        }

        cache.insert(company_id.clone(), CacheNode::new(fresh.clone(), now));
        info!(company_id = %company_id, total = cache.len(), "client cached");
        Ok(fresh)
    }

    /// Pure validation of a credential set.
    ///
    /// Construction of [`CompanyCredentials`] already enforces these rules;
    /// re-checking here keeps the manager's contract independent of how
    /// the value was produced.
    pub fn validate_credentials(
        &self,
        credentials: &CompanyCredentials,
    ) -> std::result::Result<(), ValidationError> {
        if credentials.company_id().as_str().is_empty() {
            return Err(ValidationError::new("company_id", "must not be empty"));
        }
        arca_core::Cuit::parse(credentials.cuit().as_str())?;
        if credentials.certificate().is_empty() {
            return Err(ValidationError::new("certificate", "must not be empty"));
        }
        if credentials.private_key().is_empty() {
            return Err(ValidationError::new("private_key", "must not be empty"));
        }
        Ok(())
    }

    /// Closes and removes the cached client for a company, if any.
    pub fn invalidate(&self, company_id: &CompanyId) {
        let mut cache = self.cache.write().expect("client cache poisoned");
        if let Some(node) = cache.remove(company_id) {
            self.close_client(company_id, &node.client, "invalidate");
        }
    }

    /// Closes and removes every client idle for longer than `max_idle`.
    ///
    /// Sweeps are serialised against each other; lookups block only for
    /// the duration of the in-memory pass (no I/O under the lock).
    pub fn cleanup_inactive(&self, max_idle: Duration) {
        let _sweep = self.cleanup_lock.lock().expect("cleanup lock poisoned");

        let now = self.now_millis();
        let mut cache = self.cache.write().expect("client cache poisoned");

        let expired: Vec<CompanyId> = cache
            .iter()
            .filter(|(_, node)| node.idle_for(now) >= max_idle)
            .map(|(id, _)| id.clone())
            .collect();

        for company_id in expired {
            if let Some(node) = cache.remove(&company_id) {
                self.close_client(&company_id, &node.client, "idle cleanup");
            }
        }
        drop(cache);

        let mut last = self.last_cleanup.write().expect("cleanup stamp poisoned");
        *last = Some(Utc::now());
    }

    /// Closes every cached client and empties the cache.
    ///
    /// The manager remains usable afterwards; this is the explicit release
    /// path for hosts shutting down.
    pub fn shutdown(&self) {
        let mut cache = self.cache.write().expect("client cache poisoned");
        for (company_id, node) in cache.drain() {
            self.close_client(&company_id, &node.client, "shutdown");
        }
        info!("client manager shut down");
    }

    /// Cache occupancy measured against the configured idle window.
    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.read().expect("client cache poisoned");
        let now = self.now_millis();

        let total = cache.len();
        let active = cache
            .values()
            .filter(|node| node.idle_for(now) <= self.config.client_idle_timeout)
            .count();

        CacheStats {
            total,
            active,
            inactive: total - active,
            last_cleanup: *self.last_cleanup.read().expect("cleanup stamp poisoned"),
            idle_timeout: self.config.client_idle_timeout,
        }
    }

    /// Evicts the least-recently-used entry; ties broken by creation time.
    /// Caller holds the writer lock.
    fn evict_lru(&self, cache: &mut HashMap<CompanyId, CacheNode>) {
        let victim = cache
            .iter()
            .min_by_key(|(_, node)| (node.last_used_millis(), node.created_at))
            .map(|(id, _)| id.clone());

        if let Some(company_id) = victim {
            if let Some(node) = cache.remove(&company_id) {
                self.close_client(&company_id, &node.client, "LRU eviction");
            }
        }
    }

    /// Close on the eviction path never fails from the caller's view.
    fn close_client(&self, company_id: &CompanyId, client: &CompanyClient, reason: &str) {
        if client.is_closed() {
            warn!(company_id = %company_id, reason, "client already closed");
            return;
        }
        client.close();
        debug!(company_id = %company_id, reason, "cached client closed");
    }

    fn now_millis(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
