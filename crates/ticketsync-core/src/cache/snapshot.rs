use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::CacheStore;
use crate::models::{Subject, Ticket};

/// The five well-known cache slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    ResolvedId,
    Subject,
    Subjects,
    Ticket,
    Tickets,
}

impl CacheKey {
    pub const ALL: [CacheKey; 5] = [
        CacheKey::ResolvedId,
        CacheKey::Subject,
        CacheKey::Subjects,
        CacheKey::Ticket,
        CacheKey::Tickets,
    ];

    /// Storage name of the slot.
    pub fn name(&self) -> &'static str {
        match self {
            CacheKey::ResolvedId => "userId",
            CacheKey::Subject => "userData",
            CacheKey::Subjects => "allUsersData",
            CacheKey::Ticket => "ticketData",
            CacheKey::Tickets => "allTicketsData",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed access to the cache slots.
///
/// Reads never fail: a missing slot, a storage error and an undecodable slot
/// all come back as `None`, and an undecodable slot is evicted on the way.
/// Writes are best effort and only logged when they fail.
#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn CacheStore>,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    fn load<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        let raw = match self.store.get(key.name()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(cache = %key, error = %e, "Failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(cache = %key, error = %e, "Evicting unreadable cache entry");
                self.evict(key);
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) {
        let contents = match serde_json::to_string(value) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(cache = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        match self.store.set(key.name(), &contents) {
            Ok(()) => debug!(cache = %key, bytes = contents.len(), "Cache entry written"),
            Err(e) => warn!(cache = %key, error = %e, "Failed to write cache entry"),
        }
    }

    /// Remove one slot.
    pub fn evict(&self, key: CacheKey) {
        if let Err(e) = self.store.remove(key.name()) {
            warn!(cache = %key, error = %e, "Failed to remove cache entry");
        }
    }

    /// Remove every slot.
    pub fn clear(&self) {
        for key in CacheKey::ALL {
            self.evict(key);
        }
    }

    // ===== Resolved identifier =====

    pub fn load_resolved_id(&self) -> Option<String> {
        let id: String = self.load(CacheKey::ResolvedId)?;
        if id.trim().is_empty() {
            warn!(cache = %CacheKey::ResolvedId, "Evicting empty resolved identifier");
            self.evict(CacheKey::ResolvedId);
            return None;
        }
        Some(id)
    }

    pub fn save_resolved_id(&self, id: &str) {
        self.save(CacheKey::ResolvedId, id)
    }

    // ===== Subjects =====

    pub fn load_subject(&self) -> Option<Subject> {
        self.load(CacheKey::Subject)
    }

    pub fn save_subject(&self, subject: &Subject) {
        self.save(CacheKey::Subject, subject)
    }

    pub fn load_subjects(&self) -> Option<Vec<Subject>> {
        self.load(CacheKey::Subjects)
    }

    pub fn save_subjects(&self, subjects: &[Subject]) {
        self.save(CacheKey::Subjects, subjects)
    }

    // ===== Tickets =====

    pub fn load_ticket(&self) -> Option<Ticket> {
        self.load(CacheKey::Ticket)
    }

    pub fn save_ticket(&self, ticket: &Ticket) {
        self.save(CacheKey::Ticket, ticket)
    }

    pub fn load_tickets(&self) -> Option<Vec<Ticket>> {
        self.load(CacheKey::Tickets)
    }

    pub fn save_tickets(&self, tickets: &[Ticket]) {
        self.save(CacheKey::Tickets, tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;

    fn cache() -> (Arc<MemoryCacheStore>, SnapshotCache) {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = SnapshotCache::new(store.clone());
        (store, cache)
    }

    fn subject(id: &str, name: &str) -> Subject {
        Subject {
            subject_id: id.to_string(),
            full_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_records_round_trip() {
        let (_, cache) = cache();
        let subjects = vec![subject("u1", "Ada"), subject("u2", "Grace")];
        let ticket = Ticket {
            ticket_id: "t1".into(),
            venue: "Main Hall".into(),
            ..Default::default()
        };

        cache.save_subject(&subjects[0]);
        cache.save_subjects(&subjects);
        cache.save_ticket(&ticket);
        cache.save_tickets(std::slice::from_ref(&ticket));

        assert_eq!(cache.load_subject(), Some(subjects[0].clone()));
        assert_eq!(cache.load_subjects(), Some(subjects));
        assert_eq!(cache.load_ticket(), Some(ticket.clone()));
        assert_eq!(cache.load_tickets(), Some(vec![ticket]));
    }

    #[test]
    fn test_resolved_id_is_json_string() {
        let (store, cache) = cache();
        cache.save_resolved_id("u1");
        assert_eq!(store.get("userId").unwrap().as_deref(), Some("\"u1\""));
        assert_eq!(cache.load_resolved_id().as_deref(), Some("u1"));
    }

    #[test]
    fn test_malformed_entry_is_evicted() {
        let (store, cache) = cache();
        store.set("userData", "{not json").unwrap();
        assert_eq!(cache.load_subject(), None);
        assert_eq!(store.get("userData").unwrap(), None);
    }

    #[test]
    fn test_wrong_shape_is_evicted() {
        let (store, cache) = cache();
        // Valid JSON, but a ticket where a subject collection belongs
        store.set("allUsersData", r#"{"ticketId":"t1"}"#).unwrap();
        store.set("ticketData", r#"{"userId":"u1"}"#).unwrap();
        assert_eq!(cache.load_subjects(), None);
        assert_eq!(cache.load_ticket(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_or_non_string_id_is_evicted() {
        let (store, cache) = cache();
        store.set("userId", "\"  \"").unwrap();
        assert_eq!(cache.load_resolved_id(), None);
        assert_eq!(store.get("userId").unwrap(), None);

        store.set("userId", "u1").unwrap();
        assert_eq!(cache.load_resolved_id(), None);
        assert_eq!(store.get("userId").unwrap(), None);
    }

    #[test]
    fn test_clear_removes_all_slots() {
        let (store, cache) = cache();
        cache.save_resolved_id("u1");
        cache.save_subjects(&[subject("u1", "Ada")]);
        cache.save_tickets(&[]);
        store.set("unrelated", "1").unwrap();

        cache.clear();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_cache_key_names() {
        let names: Vec<_> = CacheKey::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            ["userId", "userData", "allUsersData", "ticketData", "allTicketsData"]
        );
    }
}
