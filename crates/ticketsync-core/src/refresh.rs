//! Refresh requests and their settled outcomes.
//!
//! A refresh is split in two so the fetch can run detached from the state it
//! updates: `execute` talks to the remote and never fails, and the resulting
//! `RefreshOutcome` is folded into the state store by its single owner.

use tracing::{debug, error};

use crate::api::{find_subject, find_ticket, ApiError, RemoteFetcher};
use crate::models::{Subject, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshRequest {
    /// Fetch the subject collection and select one subject from it.
    Subject(String),
    AllSubjects,
    /// Fetch the ticket collection and select one ticket from it.
    Ticket(String),
    AllTickets,
}

impl RefreshRequest {
    /// Entity name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RefreshRequest::Subject(_) => "subject",
            RefreshRequest::AllSubjects => "subjects",
            RefreshRequest::Ticket(_) => "ticket",
            RefreshRequest::AllTickets => "tickets",
        }
    }
}

/// A settled refresh, successful or not.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// `found` is `None` when the collection had no record with `id`.
    Subject { id: String, found: Option<Subject> },
    Subjects(Vec<Subject>),
    Ticket { id: String, found: Option<Ticket> },
    Tickets(Vec<Ticket>),
    Failed {
        request: RefreshRequest,
        error: ApiError,
    },
}

/// Run one refresh against the remote. Failures are returned as
/// `RefreshOutcome::Failed`, never propagated.
pub async fn execute(fetcher: &dyn RemoteFetcher, request: RefreshRequest) -> RefreshOutcome {
    let outcome = match &request {
        RefreshRequest::Subject(id) => fetcher.fetch_subjects().await.map(|subjects| {
            RefreshOutcome::Subject {
                id: id.clone(),
                found: find_subject(&subjects, id).cloned(),
            }
        }),
        RefreshRequest::AllSubjects => fetcher.fetch_subjects().await.map(RefreshOutcome::Subjects),
        RefreshRequest::Ticket(id) => fetcher.fetch_tickets().await.map(|tickets| {
            RefreshOutcome::Ticket {
                id: id.clone(),
                found: find_ticket(&tickets, id).cloned(),
            }
        }),
        RefreshRequest::AllTickets => fetcher.fetch_tickets().await.map(RefreshOutcome::Tickets),
    };

    match outcome {
        Ok(outcome) => {
            debug!(entity = request.name(), "Refresh fetched");
            outcome
        }
        Err(error) => {
            error!(entity = request.name(), error = %error, "Refresh fetch failed");
            RefreshOutcome::Failed { request, error }
        }
    }
}
