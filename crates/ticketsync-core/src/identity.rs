//! Resolution of the active subject from the view URL and the cache.

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::debug;
use url::Url;

use crate::cache::SnapshotCache;

/// Query parameter selecting the current subject.
pub const SUBJECT_PARAM: &str = "id";

/// Query parameter selecting the current ticket.
pub const TICKET_PARAM: &str = "ticketId";

/// Base used to resolve relative locations such as `/admin?id=u1`.
const RELATIVE_BASE: &str = "http://localhost/";

/// The part of the current view the sync engine cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewLocation {
    path: String,
    subject_id: Option<String>,
    ticket_id: Option<String>,
}

impl ViewLocation {
    pub fn new(
        path: impl Into<String>,
        subject_id: Option<String>,
        ticket_id: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            subject_id: subject_id.filter(|id| !id.is_empty()),
            ticket_id: ticket_id.filter(|id| !id.is_empty()),
        }
    }

    /// Parse an absolute URL or a relative `path?query` string.
    ///
    /// The first occurrence of each parameter wins; empty values count as
    /// absent.
    pub fn parse(input: &str) -> Result<Self> {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(input))
                .with_context(|| format!("Invalid view location: {}", input))?,
            Err(e) => return Err(e).with_context(|| format!("Invalid view location: {}", input)),
        };

        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        Ok(Self::new(url.path(), param(SUBJECT_PARAM), param(TICKET_PARAM)))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn ticket_id(&self) -> Option<&str> {
        self.ticket_id.as_deref()
    }
}

impl FromStr for ViewLocation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Where a resolved identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Url,
    Cache,
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A subject identifier is available; the subject should be refreshed.
    Found { id: String, source: IdentitySource },
    /// No identifier and the view requires one: navigate to `target`.
    Redirect { target: String },
    /// No identifier inside the administrative area. Nothing to load.
    Unresolved,
}

/// Decides which subject is current. Never navigates by itself.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    admin_prefix: String,
    fallback_path: String,
}

impl IdentityResolver {
    pub fn new(admin_prefix: impl Into<String>, fallback_path: impl Into<String>) -> Self {
        Self {
            admin_prefix: admin_prefix.into(),
            fallback_path: fallback_path.into(),
        }
    }

    pub fn is_admin_area(&self, path: &str) -> bool {
        path.starts_with(&self.admin_prefix)
    }

    /// Full resolution, run on activation.
    ///
    /// An identifier taken from the URL is persisted before it is returned.
    pub fn resolve(&self, location: &ViewLocation, cache: &SnapshotCache) -> Resolution {
        if let Some(id) = location.subject_id() {
            cache.save_resolved_id(id);
            debug!(id, "Subject identifier taken from URL");
            return Resolution::Found {
                id: id.to_string(),
                source: IdentitySource::Url,
            };
        }

        if let Some(id) = cache.load_resolved_id() {
            debug!(id = %id, "Subject identifier taken from cache");
            return Resolution::Found {
                id,
                source: IdentitySource::Cache,
            };
        }

        if self.is_admin_area(location.path()) {
            Resolution::Unresolved
        } else {
            Resolution::Redirect {
                target: self.fallback_path.clone(),
            }
        }
    }

    /// Lightweight resolution used on poll ticks: URL else cache, no
    /// persistence and no redirect.
    pub fn resolve_for_tick(&self, location: &ViewLocation, cache: &SnapshotCache) -> Option<String> {
        location
            .subject_id()
            .map(str::to_string)
            .or_else(|| cache.load_resolved_id())
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new("/admin", "/invalid")
    }
}
