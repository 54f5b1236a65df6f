//! The live state exposed to consumers and its persisted mirror.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::RemoteFetcher;
use crate::cache::{CacheKey, SnapshotCache};
use crate::models::{Subject, Ticket};
use crate::refresh::{self, RefreshOutcome, RefreshRequest};

/// Everything a consumer can observe.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSnapshot {
    pub subject: Option<Subject>,
    pub ticket: Option<Ticket>,
    pub subjects: Vec<Subject>,
    pub tickets: Vec<Ticket>,
    /// True until the first refresh or resolution settles.
    pub loading: bool,
    /// When a refresh last changed the state.
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl Default for SyncSnapshot {
    fn default() -> Self {
        Self {
            subject: None,
            ticket: None,
            subjects: Vec::new(),
            tickets: Vec::new(),
            loading: true,
            last_refreshed: None,
        }
    }
}

impl SyncSnapshot {
    /// Human readable age of the last refresh.
    pub fn age_display(&self) -> String {
        let Some(at) = self.last_refreshed else {
            return "never".to_string();
        };
        let seconds = (Utc::now() - at).num_seconds();
        if seconds < 5 {
            // Includes clock skew
            "just now".to_string()
        } else if seconds < 60 {
            format!("{}s ago", seconds)
        } else if seconds < 3600 {
            format!("{}m ago", seconds / 60)
        } else {
            format!("{}h ago", seconds / 3600)
        }
    }
}

/// What hydration found in the cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Hydration {
    /// Record slots adopted into memory.
    pub adopted: Vec<CacheKey>,
    /// Resolved identifier still held by the cache.
    pub resolved_id: Option<String>,
}

/// Sole owner of the live records.
///
/// The cache is only ever written from here (and by the identity resolver
/// for the resolved identifier).
pub struct StateStore {
    state: SyncSnapshot,
    cache: SnapshotCache,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl StateStore {
    pub fn new(cache: SnapshotCache, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            state: SyncSnapshot::default(),
            cache,
            fetcher,
        }
    }

    pub fn snapshot(&self) -> &SyncSnapshot {
        &self.state
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn fetcher(&self) -> Arc<dyn RemoteFetcher> {
        Arc::clone(&self.fetcher)
    }

    /// Adopt every decodable cache slot. Slots are independent: an evicted
    /// slot does not stop the others from loading, and an absent slot leaves
    /// the in-memory value alone.
    pub fn hydrate(&mut self) -> Hydration {
        let mut hydration = Hydration::default();

        if let Some(subject) = self.cache.load_subject() {
            self.state.subject = Some(subject);
            hydration.adopted.push(CacheKey::Subject);
        }

        if let Some(subjects) = self.cache.load_subjects() {
            self.state.subjects = subjects;
            hydration.adopted.push(CacheKey::Subjects);
        }

        if let Some(ticket) = self.cache.load_ticket() {
            self.state.ticket = Some(ticket);
            hydration.adopted.push(CacheKey::Ticket);
        }

        if let Some(tickets) = self.cache.load_tickets() {
            self.state.tickets = tickets;
            hydration.adopted.push(CacheKey::Tickets);
        }

        hydration.resolved_id = self.cache.load_resolved_id();
        hydration
    }

    // ===== Mutators =====

    pub fn set_subject(&mut self, subject: Option<Subject>) {
        self.state.subject = subject;
    }

    pub fn set_subjects(&mut self, subjects: Vec<Subject>) {
        self.state.subjects = subjects;
    }

    pub fn set_ticket(&mut self, ticket: Option<Ticket>) {
        self.state.ticket = ticket;
    }

    pub fn set_tickets(&mut self, tickets: Vec<Ticket>) {
        self.state.tickets = tickets;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    /// Fold a settled refresh into memory and the cache.
    ///
    /// Failures and lookups that found nothing leave the records untouched.
    /// Loading is cleared either way.
    pub fn apply(&mut self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Subject { id, found } => match found {
                Some(subject) => {
                    self.cache.save_subject(&subject);
                    self.state.subject = Some(subject);
                    self.touch();
                }
                None => debug!(id = %id, "Subject not present in collection"),
            },
            RefreshOutcome::Subjects(subjects) => {
                self.cache.save_subjects(&subjects);
                self.state.subjects = subjects;
                self.touch();
            }
            RefreshOutcome::Ticket { id, found } => match found {
                Some(ticket) => {
                    self.cache.save_ticket(&ticket);
                    self.state.ticket = Some(ticket);
                    self.touch();
                }
                None => debug!(id = %id, "Ticket not present in collection"),
            },
            RefreshOutcome::Tickets(tickets) => {
                self.cache.save_tickets(&tickets);
                self.state.tickets = tickets;
                self.touch();
            }
            RefreshOutcome::Failed { request, error } => {
                warn!(entity = request.name(), error = %error, "Keeping previous state after failed refresh");
            }
        }
        self.state.loading = false;
    }

    fn touch(&mut self) {
        self.state.last_refreshed = Some(Utc::now());
    }

    // ===== Refresh operations =====

    pub async fn refresh(&mut self, request: RefreshRequest) {
        let outcome = refresh::execute(self.fetcher.as_ref(), request).await;
        self.apply(outcome);
    }

    pub async fn refresh_subject(&mut self, id: &str) {
        self.refresh(RefreshRequest::Subject(id.to_string())).await
    }

    pub async fn refresh_all_subjects(&mut self) {
        info!("Refreshing all subjects");
        self.refresh(RefreshRequest::AllSubjects).await
    }

    pub async fn refresh_ticket(&mut self, id: &str) {
        self.refresh(RefreshRequest::Ticket(id.to_string())).await
    }

    pub async fn refresh_all_tickets(&mut self) {
        info!("Refreshing all tickets");
        self.refresh(RefreshRequest::AllTickets).await
    }
}
