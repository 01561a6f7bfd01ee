//! Per-asset polling timers.
//!
//! Each tracking session runs as its own task that owns the session state:
//! one immediate evaluation, then one tick per poll interval. The scheduler
//! only keeps the task handle and a read-only status channel per key, so no
//! lock is shared between sessions.

use crate::engine::AlertEngine;
use crate::notifier::NotificationSink;
use coin_alert_core::{AlertConfig, Asset, CurrencyUnit, PriceZone};
use coin_alert_feeds::{FeedError, SourceFactory};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Scheduler is shut down")]
    ShutDown,
}

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Minimum time between two effective checks of one session.
    /// Ticks arriving earlier (timer drift) are skipped.
    pub min_check_spacing: Duration,
    /// Send the first price fetch error of a session to its destination.
    pub report_errors: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_check_spacing: Duration::from_secs(30),
            report_errors: true,
        }
    }
}

/// Identifies a tracking session: one per (destination, asset).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub destination: String,
    pub asset: Asset,
}

impl SessionKey {
    pub fn new(destination: impl Into<String>, asset: Asset) -> Self {
        Self {
            destination: destination.into(),
            asset,
        }
    }
}

/// Lifecycle of a tracking session. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Registered, first evaluation not finished yet.
    Created,
    /// Timer running.
    Armed,
    /// Timer cancelled and session removed.
    Stopped,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub asset: Asset,
    pub currency: CurrencyUnit,
    pub precision: u32,
    pub zone: Option<PriceZone>,
    pub last_price: Option<f64>,
    pub state: SessionState,
}

/// Returned by [`Scheduler::start`]; identifies one specific session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    key: SessionKey,
    id: u64,
}

impl SessionHandle {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Live session bookkeeping held by the scheduler.
struct SessionEntry {
    id: u64,
    task: JoinHandle<()>,
    status: watch::Receiver<SessionSnapshot>,
}

impl SessionEntry {
    /// Abort the session task and wait until it has terminated.
    async fn cancel(self) {
        self.task.abort();
        match self.task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => error!(error = %e, "Alert session task panicked"),
        }
    }
}

/// Mutable state of one session, owned by its task.
struct TrackingSession {
    key: SessionKey,
    engine: AlertEngine,
    last_checked_at: Option<Instant>,
    error_reported: bool,
}

impl TrackingSession {
    fn snapshot(&self, state: SessionState) -> SessionSnapshot {
        let config = self.engine.config();
        SessionSnapshot {
            asset: config.asset(),
            currency: config.currency(),
            precision: config.precision(),
            zone: self.engine.zone(),
            last_price: self.engine.last_price(),
            state,
        }
    }

    /// Timer tick: evaluate unless the last check is too recent.
    async fn tick(&mut self, sink: &dyn NotificationSink, config: &SchedulerConfig) {
        let now = Instant::now();
        if let Some(last) = self.last_checked_at {
            let elapsed = now.duration_since(last);
            if elapsed < config.min_check_spacing {
                debug!(
                    asset = %self.key.asset,
                    destination = %self.key.destination,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Skipping tick: checked too recently"
                );
                return;
            }
        }
        self.check(sink, config).await;
    }

    /// Evaluate now and forward any alert or first error to the destination.
    async fn check(&mut self, sink: &dyn NotificationSink, config: &SchedulerConfig) {
        self.last_checked_at = Some(Instant::now());
        debug!(
            asset = %self.key.asset,
            destination = %self.key.destination,
            source = self.engine.source_name(),
            "Checking price"
        );

        match self.engine.evaluate().await {
            Ok(messages) => {
                if !messages.is_empty() {
                    info!(
                        asset = %self.key.asset,
                        destination = %self.key.destination,
                        zone = ?self.engine.zone(),
                        "Zone changed, sending alert"
                    );
                    self.deliver(sink, &messages).await;
                }
            }
            Err(e) => {
                warn!(
                    asset = %self.key.asset,
                    destination = %self.key.destination,
                    error = %e,
                    transient = e.is_transient(),
                    "Price check failed"
                );
                if config.report_errors && !self.error_reported {
                    self.error_reported = true;
                    let report = vec![format!("An error occurred: {}", e)];
                    self.deliver(sink, &report).await;
                }
            }
        }
    }

    async fn deliver(&self, sink: &dyn NotificationSink, messages: &[String]) {
        if let Err(e) = sink.send(&self.key.destination, messages).await {
            error!(
                destination = %self.key.destination,
                error = %e,
                "Failed to deliver alert"
            );
        }
    }
}

async fn run_session(
    mut session: TrackingSession,
    sink: Arc<dyn NotificationSink>,
    config: SchedulerConfig,
    status: watch::Sender<SessionSnapshot>,
) {
    session.check(sink.as_ref(), &config).await;
    status.send_replace(session.snapshot(SessionState::Armed));

    let period = session.engine.config().poll_interval();
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        session.tick(sink.as_ref(), &config).await;
        status.send_replace(session.snapshot(SessionState::Armed));
    }
}

/// Owns every tracking session and its timer.
pub struct Scheduler {
    config: SchedulerConfig,
    sources: SourceFactory,
    sink: Arc<dyn NotificationSink>,
    sessions: DashMap<SessionKey, SessionEntry>,
    next_id: AtomicU64,
    shut_down: AtomicBool,
}

impl Scheduler {
    /// Create a scheduler that builds price sources with `sources` and
    /// delivers alerts through `sink`.
    pub fn new(config: SchedulerConfig, sources: SourceFactory, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            sources,
            sink,
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Start tracking `config.asset()` for `destination`.
    ///
    /// Any session already running for the same key is cancelled first. The
    /// first evaluation runs in the background; this only waits for the
    /// previous session to be torn down.
    pub async fn start(
        &self,
        destination: impl Into<String>,
        config: AlertConfig,
    ) -> Result<SessionHandle, SchedulerError> {
        if self.is_shut_down() {
            return Err(SchedulerError::ShutDown);
        }

        let key = SessionKey::new(destination, config.asset());
        let engine = AlertEngine::new(config, (self.sources)())?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if let Some((_, previous)) = self.sessions.remove(&key) {
            previous.cancel().await;
            info!(
                asset = %key.asset,
                destination = %key.destination,
                "Replaced existing alert session"
            );
        }

        let session = TrackingSession {
            key: key.clone(),
            engine,
            last_checked_at: None,
            error_reported: false,
        };
        let (status_tx, status_rx) = watch::channel(session.snapshot(SessionState::Created));
        let poll_interval = session.engine.config().poll_interval();
        let task = tokio::spawn(run_session(
            session,
            Arc::clone(&self.sink),
            self.config.clone(),
            status_tx,
        ));

        let entry = SessionEntry {
            id,
            task,
            status: status_rx,
        };
        if let Some(raced) = self.sessions.insert(key.clone(), entry) {
            // Concurrent start for the same key won the first remove.
            raced.cancel().await;
        }

        if self.is_shut_down() {
            if let Some((_, entry)) = self.sessions.remove(&key) {
                entry.cancel().await;
            }
            return Err(SchedulerError::ShutDown);
        }

        info!(
            asset = %key.asset,
            destination = %key.destination,
            poll_secs = poll_interval.as_secs(),
            "Alert session started"
        );
        Ok(SessionHandle { key, id })
    }

    /// Stop the session for (destination, asset). Returns whether one existed.
    /// No tick of that session runs after this returns.
    pub async fn stop(&self, destination: &str, asset: Asset) -> bool {
        let key = SessionKey::new(destination, asset);
        match self.sessions.remove(&key) {
            Some((_, entry)) => {
                entry.cancel().await;
                info!(asset = %asset, destination = destination, "Alert session stopped");
                true
            }
            None => false,
        }
    }

    /// Cancel every session and refuse new ones.
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);

        let keys: Vec<SessionKey> = self.sessions.iter().map(|e| e.key().clone()).collect();
        let mut cancelled = 0usize;
        for key in keys {
            if let Some((_, entry)) = self.sessions.remove(&key) {
                entry.cancel().await;
                cancelled += 1;
            }
        }

        info!(cancelled = cancelled, "All alert sessions cancelled");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Lifecycle state of the session behind `handle`.
    pub fn state(&self, handle: &SessionHandle) -> SessionState {
        let Some(entry) = self.sessions.get(&handle.key) else {
            return SessionState::Stopped;
        };
        if entry.id != handle.id {
            return SessionState::Stopped;
        }
        let state = entry.status.borrow().state;
        state
    }

    /// Snapshots of every live session for `destination`, ordered by asset.
    pub fn sessions(&self, destination: &str) -> Vec<SessionSnapshot> {
        let mut snapshots: Vec<SessionSnapshot> = self
            .sessions
            .iter()
            .filter(|e| e.key().destination == destination)
            .map(|e| e.value().status.borrow().clone())
            .collect();
        snapshots.sort_by_key(|s| s.asset.id());
        snapshots
    }

    /// Number of live sessions across all destinations.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
