//! HTTP client for the two sheet endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ApiError;
use crate::models::{find_by_key, Subject, Ticket};

/// Source of the full subject and ticket collections.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch every subject record, in remote order.
    async fn fetch_subjects(&self) -> Result<Vec<Subject>, ApiError>;

    /// Fetch every ticket record, in remote order.
    async fn fetch_tickets(&self) -> Result<Vec<Ticket>, ApiError>;
}

/// Select a subject out of a freshly fetched collection.
pub fn find_subject<'a>(subjects: &'a [Subject], id: &str) -> Option<&'a Subject> {
    find_by_key(subjects, id)
}

/// Select a ticket out of a freshly fetched collection.
pub fn find_ticket<'a>(tickets: &'a [Ticket], id: &str) -> Option<&'a Ticket> {
    find_by_key(tickets, id)
}

/// Reads the subject and ticket sheets over HTTP.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct SheetClient {
    client: Client,
    subjects_url: Url,
    tickets_url: Url,
}

impl SheetClient {
    /// Create a client for the given endpoints.
    ///
    /// `timeout` is applied by the transport to every request; nothing above
    /// this layer imposes one.
    pub fn new(subjects_url: &str, tickets_url: &str, timeout: Duration) -> Result<Self> {
        let subjects_url = Url::parse(subjects_url)
            .with_context(|| format!("Invalid subjects endpoint: {}", subjects_url))?;
        let tickets_url = Url::parse(tickets_url)
            .with_context(|| format!("Invalid tickets endpoint: {}", tickets_url))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            subjects_url,
            tickets_url,
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }

        debug!(url = %url, bytes = text.len(), "Sheet response received");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl RemoteFetcher for SheetClient {
    async fn fetch_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.get(&self.subjects_url).await
    }

    async fn fetch_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        self.get(&self.tickets_url).await
    }
}
