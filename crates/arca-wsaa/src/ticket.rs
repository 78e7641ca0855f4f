//! Access tickets and the per-service ticket cache.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Safety margin subtracted from ticket expiry to absorb clock drift and
/// in-flight latency: a ticket within five minutes of expiring is treated
/// as already expired.
pub const TICKET_EXPIRY_SKEW: Duration = Duration::minutes(5);

/// Validity window the authentication endpoint guarantees for new tickets.
pub const TICKET_VALIDITY: Duration = Duration::hours(24);

/// A `(token, sign)` credential pair returned by the authentication
/// endpoint. Immutable once minted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTicket {
    pub token: String,
    pub sign: String,
    pub generation_time: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}

impl AccessTicket {
    /// Whether the ticket is still safely usable at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TICKET_EXPIRY_SKEW < self.expiration_time
    }
}

/// Ticket store for one company client, keyed by downstream service.
///
/// Readers only observe; a stale entry found on the read path is removed by
/// a subsequent writer-locked pass that re-checks staleness, so concurrent
/// lookups never race a removal they did not agree on. No lock is held
/// during the sign-and-exchange that produces a ticket.
#[derive(Debug, Default)]
pub struct TicketCache {
    entries: RwLock<HashMap<String, AccessTicket>>,
}

impl TicketCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached ticket for `service` if it is fresh at `now`.
    ///
    /// Stale entries are left in place; callers turn around and call
    /// [`evict_stale`](Self::evict_stale) before re-acquiring.
    #[must_use]
    pub fn fresh(&self, service: &str, now: DateTime<Utc>) -> Option<AccessTicket> {
        let entries = self.entries.read().expect("ticket cache poisoned");
        entries
            .get(service)
            .filter(|ticket| ticket.is_fresh(now))
            .cloned()
    }

    /// Removes the entry for `service` if it is (still) stale at `now`.
    ///
    /// Re-checks under the writer lock: a concurrent acquisition may have
    /// already replaced the entry with a fresh one, which is then kept.
    pub fn evict_stale(&self, service: &str, now: DateTime<Utc>) {
        let mut entries = self.entries.write().expect("ticket cache poisoned");
        if let Some(ticket) = entries.get(service) {
            if !ticket.is_fresh(now) {
                entries.remove(service);
            }
        }
    }

    /// Inserts a ticket, replacing any previous entry (last writer wins).
    pub fn insert(&self, service: &str, ticket: AccessTicket) {
        let mut entries = self.entries.write().expect("ticket cache poisoned");
        entries.insert(service.to_string(), ticket);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().expect("ticket cache poisoned");
        entries.clear();
    }

    /// Current number of cached tickets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("ticket cache poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(valid_for: Duration) -> AccessTicket {
        let now = Utc::now();
        AccessTicket {
            token: "tok".into(),
            sign: "sig".into(),
            generation_time: now,
            expiration_time: now + valid_for,
        }
    }

    #[test]
    fn fresh_ticket_is_returned() {
        let cache = TicketCache::new();
        cache.insert("wsfe", ticket(Duration::hours(24)));
        assert!(cache.fresh("wsfe", Utc::now()).is_some());
    }

    #[test]
    fn ticket_inside_skew_window_is_not_fresh() {
        let cache = TicketCache::new();
        // Four minutes of validity is inside the five-minute skew.
        cache.insert("wsfe", ticket(Duration::minutes(4)));
        assert!(cache.fresh("wsfe", Utc::now()).is_none());
        // The stale entry is observed, not removed.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evict_stale_removes_only_stale_entries() {
        let cache = TicketCache::new();
        cache.insert("wsfe", ticket(Duration::minutes(4)));
        cache.evict_stale("wsfe", Utc::now());
        assert_eq!(cache.len(), 0);

        cache.insert("wsfe", ticket(Duration::hours(24)));
        cache.evict_stale("wsfe", Utc::now());
        assert_eq!(cache.len(), 1, "fresh entry must survive eviction");
    }

    #[test]
    fn clear_drops_everything() {
        let cache = TicketCache::new();
        cache.insert("wsfe", ticket(Duration::hours(24)));
        cache.insert("wsfex", ticket(Duration::hours(24)));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_is_last_writer_wins() {
        let cache = TicketCache::new();
        let first = ticket(Duration::hours(24));
        let mut second = ticket(Duration::hours(24));
        second.token = "tok2".into();
        cache.insert("wsfe", first);
        cache.insert("wsfe", second.clone());
        assert_eq!(cache.fresh("wsfe", Utc::now()), Some(second));
    }
}
