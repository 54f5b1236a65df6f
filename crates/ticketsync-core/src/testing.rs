//! In-memory fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, RemoteFetcher};
use crate::engine::Navigator;
use crate::models::{Subject, Ticket};

pub fn subject(id: &str) -> Subject {
    Subject {
        subject_id: id.to_string(),
        full_name: format!("Subject {}", id),
        ..Default::default()
    }
}

pub fn ticket(id: &str) -> Ticket {
    Ticket {
        ticket_id: id.to_string(),
        event_name: format!("Event {}", id),
        ..Default::default()
    }
}

fn server_error() -> ApiError {
    ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Serves fixed collections, optionally failing or delaying.
///
/// Scripted subject responses are consumed first, one per call, each after
/// its own delay; once the script is empty the fixed collection is served.
#[derive(Default)]
pub struct FakeFetcher {
    subjects: Mutex<Vec<Subject>>,
    tickets: Mutex<Vec<Ticket>>,
    subject_script: Mutex<VecDeque<(Duration, Vec<Subject>)>>,
    delay: Mutex<Duration>,
    fail_subjects: AtomicBool,
    fail_tickets: AtomicBool,
    subject_calls: AtomicUsize,
    ticket_calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new(subjects: Vec<Subject>, tickets: Vec<Ticket>) -> Self {
        Self {
            subjects: Mutex::new(subjects),
            tickets: Mutex::new(tickets),
            ..Default::default()
        }
    }

    pub fn set_subjects(&self, subjects: Vec<Subject>) {
        *self.subjects.lock().unwrap() = subjects;
    }

    pub fn script_subjects(&self, delay: Duration, subjects: Vec<Subject>) {
        self.subject_script.lock().unwrap().push_back((delay, subjects));
    }

    /// Delay applied to every unscripted call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn fail_subjects(&self, fail: bool) {
        self.fail_subjects.store(fail, Ordering::SeqCst);
    }

    pub fn fail_tickets(&self, fail: bool) {
        self.fail_tickets.store(fail, Ordering::SeqCst);
    }

    pub fn subject_calls(&self) -> usize {
        self.subject_calls.load(Ordering::SeqCst)
    }

    pub fn ticket_calls(&self) -> usize {
        self.ticket_calls.load(Ordering::SeqCst)
    }

    fn delay(&self) -> Duration {
        *self.delay.lock().unwrap()
    }
}

#[async_trait]
impl RemoteFetcher for FakeFetcher {
    async fn fetch_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.subject_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.subject_script.lock().unwrap().pop_front();
        if let Some((delay, subjects)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(subjects);
        }

        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_subjects.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.subjects.lock().unwrap().clone())
    }

    async fn fetch_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        self.ticket_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_tickets.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.tickets.lock().unwrap().clone())
    }
}

/// Records every redirect it is asked to perform.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, target: &str) {
        self.redirects.lock().unwrap().push(target.to_string());
    }
}
