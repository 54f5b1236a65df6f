//! Runtime that keeps a `StateStore` in sync with the remote.
//!
//! The engine runs as one spawned task and is the only writer of state.
//! Fetches run as their own tasks and report back through a channel, so a
//! subject refresh and a ticket refresh can be in flight at the same time;
//! whichever settles last wins. Consumers observe the state through a
//! `watch` channel and drive the engine through a `SyncHandle`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::RemoteFetcher;
use crate::cache::{CacheStore, SnapshotCache};
use crate::config::{Config, DEFAULT_POLL_INTERVAL_MS};
use crate::identity::{IdentityResolver, Resolution, ViewLocation};
use crate::models::{Subject, Ticket};
use crate::refresh::{self, RefreshOutcome, RefreshRequest};
use crate::scheduler::PollScheduler;
use crate::store::{StateStore, SyncSnapshot};

/// Buffer size for the command and outcome channels.
/// A poll cycle issues at most four fetches, so 32 leaves plenty of headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Performs navigation on behalf of the engine.
pub trait Navigator: Send + Sync {
    /// Navigate the current view to `target`.
    fn redirect(&self, target: &str);
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub poll_interval: Duration,
    pub resolver: IdentityResolver,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            resolver: IdentityResolver::default(),
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            resolver: config.resolver(),
        }
    }
}

#[derive(Debug)]
enum Command {
    Navigate(ViewLocation),
    Refresh(RefreshRequest),
    SetSubject(Option<Subject>),
    SetSubjects(Vec<Subject>),
    SetTicket(Option<Ticket>),
    SetTickets(Vec<Ticket>),
    Tick,
    Shutdown,
}

pub struct SyncEngine {
    store: StateStore,
    resolver: IdentityResolver,
    scheduler: PollScheduler,
    poll_interval: Duration,
    navigator: Arc<dyn Navigator>,
    location: ViewLocation,
    commands: mpsc::WeakSender<Command>,
    outcomes: mpsc::Sender<RefreshOutcome>,
    publisher: watch::Sender<SyncSnapshot>,
}

impl SyncEngine {
    /// Activate the engine for `location` and return a handle to it.
    ///
    /// Hydration, the first resolution pass and arming of the poll timer all
    /// happen before the first snapshot is published.
    pub fn spawn(
        options: EngineOptions,
        fetcher: Arc<dyn RemoteFetcher>,
        cache: Arc<dyn CacheStore>,
        navigator: Arc<dyn Navigator>,
        location: ViewLocation,
    ) -> SyncHandle {
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (outcome_tx, outcome_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (publisher, state) = watch::channel(SyncSnapshot::default());

        let engine = SyncEngine {
            store: StateStore::new(SnapshotCache::new(cache), fetcher),
            resolver: options.resolver,
            scheduler: PollScheduler::new(),
            poll_interval: options.poll_interval,
            navigator,
            location,
            commands: command_tx.downgrade(),
            outcomes: outcome_tx,
            publisher,
        };

        let task = tokio::spawn(engine.run(command_rx, outcome_rx));

        SyncHandle {
            commands: command_tx,
            state,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut outcomes: mpsc::Receiver<RefreshOutcome>,
    ) {
        info!(path = self.location.path(), "Sync engine starting");
        self.activate();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Navigate(location)) => {
                        debug!(path = location.path(), "Reconfiguring for new location");
                        self.location = location;
                        self.activate();
                    }
                    Some(Command::Refresh(request)) => self.spawn_refresh(request),
                    Some(Command::SetSubject(subject)) => {
                        self.store.set_subject(subject);
                        self.publish();
                    }
                    Some(Command::SetSubjects(subjects)) => {
                        self.store.set_subjects(subjects);
                        self.publish();
                    }
                    Some(Command::SetTicket(ticket)) => {
                        self.store.set_ticket(ticket);
                        self.publish();
                    }
                    Some(Command::SetTickets(tickets)) => {
                        self.store.set_tickets(tickets);
                        self.publish();
                    }
                    Some(Command::Tick) => self.tick(),
                    Some(Command::Shutdown) | None => break,
                },
                Some(outcome) = outcomes.recv() => {
                    self.store.apply(outcome);
                    self.publish();
                }
            }
        }

        self.teardown();
    }

    /// One full resolution cycle followed by (re)arming the poll timer.
    fn activate(&mut self) {
        self.scheduler.cancel();
        let hydration = self.store.hydrate();
        debug!(
            adopted = ?hydration.adopted,
            cached_id = ?hydration.resolved_id,
            "Hydrated from cache"
        );

        match self.resolver.resolve(&self.location, self.store.cache()) {
            Resolution::Found { id, source } => {
                debug!(id = %id, ?source, "Subject resolved");
                self.spawn_refresh(RefreshRequest::Subject(id));
            }
            Resolution::Redirect { target } => {
                warn!(path = self.location.path(), fallback = %target, "No subject identifier, redirecting");
                self.navigator.redirect(&target);
                self.store.set_loading(false);
            }
            Resolution::Unresolved => {
                debug!("No subject selected in administrative view");
                self.store.set_loading(false);
            }
        }

        if let Some(ticket_id) = self.location.ticket_id() {
            self.spawn_refresh(RefreshRequest::Ticket(ticket_id.to_string()));
        }

        self.publish();
        self.arm();
    }

    fn arm(&mut self) {
        let commands = self.commands.clone();
        self.scheduler.arm(self.poll_interval, move || {
            let Some(commands) = commands.upgrade() else {
                return;
            };
            // A tick that finds the queue full is skipped; the next one retries.
            if let Err(e) = commands.try_send(Command::Tick) {
                debug!(error = %e, "Dropping poll tick");
            }
        });
    }

    fn tick(&mut self) {
        if let Some(id) = self.resolver.resolve_for_tick(&self.location, self.store.cache()) {
            self.spawn_refresh(RefreshRequest::Subject(id));
        }
        self.spawn_refresh(RefreshRequest::AllSubjects);
        self.spawn_refresh(RefreshRequest::AllTickets);
    }

    fn spawn_refresh(&self, request: RefreshRequest) {
        let fetcher = self.store.fetcher();
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let outcome = refresh::execute(fetcher.as_ref(), request).await;
            if outcomes.send(outcome).await.is_err() {
                debug!("Sync engine stopped, dropping refresh outcome");
            }
        });
    }

    fn publish(&self) {
        let snapshot = self.store.snapshot();
        self.publisher.send_if_modified(|current| {
            if *current == *snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
    }

    fn teardown(&mut self) {
        self.scheduler.cancel();
        info!("Sync engine stopped");
    }
}

/// Consumer side of a running `SyncEngine`.
///
/// Dropping the handle tears the engine down as well.
pub struct SyncHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SyncSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("Sync engine is not running"))
    }

    /// The view moved: re-hydrate, re-resolve and re-arm the poll timer.
    pub async fn navigate(&self, location: ViewLocation) -> Result<()> {
        self.send(Command::Navigate(location)).await
    }

    pub async fn refresh_subject(&self, id: impl Into<String>) -> Result<()> {
        self.send(Command::Refresh(RefreshRequest::Subject(id.into()))).await
    }

    pub async fn refresh_all_subjects(&self) -> Result<()> {
        self.send(Command::Refresh(RefreshRequest::AllSubjects)).await
    }

    pub async fn refresh_ticket(&self, id: impl Into<String>) -> Result<()> {
        self.send(Command::Refresh(RefreshRequest::Ticket(id.into()))).await
    }

    pub async fn refresh_all_tickets(&self) -> Result<()> {
        self.send(Command::Refresh(RefreshRequest::AllTickets)).await
    }

    // Local overrides. They replace the in-memory value only; the cache
    // keeps whatever the last refresh wrote, and the next refresh of the
    // same slot overwrites the override.

    pub async fn set_subject(&self, subject: Option<Subject>) -> Result<()> {
        self.send(Command::SetSubject(subject)).await
    }

    pub async fn set_subjects(&self, subjects: Vec<Subject>) -> Result<()> {
        self.send(Command::SetSubjects(subjects)).await
    }

    pub async fn set_ticket(&self, ticket: Option<Ticket>) -> Result<()> {
        self.send(Command::SetTicket(ticket)).await
    }

    pub async fn set_tickets(&self, tickets: Vec<Ticket>) -> Result<()> {
        self.send(Command::SetTickets(tickets)).await
    }

    /// Current state.
    pub fn snapshot(&self) -> SyncSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop polling and wait for the engine to exit. Calling it again is a
    /// no-op.
    pub async fn shutdown(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        // Fails only when the engine already exited
        let _ = self.commands.send(Command::Shutdown).await;
        if let Err(e) = task.await {
            error!(error = %e, "Sync engine task failed");
        }
    }
}
