//! Poll scheduler - one background thread owns the data source.
//!
//! Every tick (or on a manual refresh) the scheduler fetches all data kinds
//! in parallel on a private rayon pool, settles each result, and sends one
//! [`DashboardSnapshot`] to the UI over an `mpsc` channel. A failed fetch is
//! logged, recorded as a [`FetchFailure`], and replaced by the last good
//! value for that kind (or an empty default before the first success).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSet, MarketPoint, Order, Position, StrategyConfig, Wallet};
use crate::source::{DataSource, SourceError, SourceKind};

/// One fetch per kind per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataKind {
    Features,
    Position,
    Orders,
    Strategy,
    Wallet,
    Market,
}

impl DataKind {
    pub const ALL: [DataKind; 6] = [
        DataKind::Features,
        DataKind::Position,
        DataKind::Orders,
        DataKind::Strategy,
        DataKind::Wallet,
        DataKind::Market,
    ];
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataKind::Features => "features",
            DataKind::Position => "position",
            DataKind::Orders => "orders",
            DataKind::Strategy => "strategy",
            DataKind::Wallet => "wallet",
            DataKind::Market => "market",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub kind: DataKind,
    pub message: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to fetch {}: {}", self.kind, self.message)
    }
}

/// Everything the dashboard shows, as of one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Monotonic tick counter, starting at 1.
    pub seq: u64,
    pub fetched_at: DateTime<Utc>,
    pub source: SourceKind,
    pub features: FeatureSet,
    pub position: Option<Position>,
    pub orders: Vec<Order>,
    pub strategy: Option<StrategyConfig>,
    pub wallet: Option<Wallet>,
    pub market: Vec<MarketPoint>,
    pub failures: Vec<FetchFailure>,
    /// BLAKE3 of the feature data.
    pub fingerprint: String,
    /// Features whose data differs from the previous snapshot.
    pub changed_features: BTreeSet<String>,
}

impl DashboardSnapshot {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Last good value per kind.
#[derive(Debug, Default)]
struct LastGood {
    features: FeatureSet,
    position: Option<Position>,
    orders: Vec<Order>,
    strategy: Option<StrategyConfig>,
    wallet: Option<Wallet>,
    market: Vec<MarketPoint>,
    feature_fingerprints: BTreeMap<String, String>,
}

fn settle<T: Clone>(
    kind: DataKind,
    result: Result<T, SourceError>,
    last: &mut T,
    failures: &mut Vec<FetchFailure>,
) -> T {
    match result {
        Ok(value) => {
            *last = value.clone();
            value
        }
        Err(e) => {
            tracing::warn!(%kind, error = %e, "fetch failed, keeping previous value");
            failures.push(FetchFailure {
                kind,
                message: e.to_string(),
            });
            last.clone()
        }
    }
}

/// Fetches and settles snapshots. Usable without the scheduler thread.
pub struct SnapshotFetcher {
    pool: rayon::ThreadPool,
    last: LastGood,
    seq: u64,
}

impl SnapshotFetcher {
    pub fn new() -> Result<Self, rayon::ThreadPoolBuildError> {
        // Fetches are blocking I/O: one thread per kind.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(DataKind::ALL.len())
            .thread_name(|i| format!("botdash-fetch-{i}"))
            .build()?;
        Ok(Self {
            pool,
            last: LastGood::default(),
            seq: 0,
        })
    }

    /// Fetch every kind in parallel and return once all have settled.
    pub fn fetch(&mut self, source: &dyn DataSource) -> DashboardSnapshot {
        let started = Instant::now();
        let ((features, position), ((orders, strategy), (wallet, market))) = self.pool.install(|| {
            rayon::join(
                || rayon::join(|| source.features(), || source.position()),
                || {
                    rayon::join(
                        || rayon::join(|| source.orders(), || source.strategy()),
                        || rayon::join(|| source.wallet(), || source.market()),
                    )
                },
            )
        });

        let mut failures = Vec::new();
        let last = &mut self.last;
        let features = settle(DataKind::Features, features, &mut last.features, &mut failures);
        let position = settle(DataKind::Position, position, &mut last.position, &mut failures);
        let orders = settle(DataKind::Orders, orders, &mut last.orders, &mut failures);
        let strategy = settle(DataKind::Strategy, strategy.map(Some), &mut last.strategy, &mut failures);
        let wallet = settle(DataKind::Wallet, wallet.map(Some), &mut last.wallet, &mut failures);
        let market = settle(DataKind::Market, market, &mut last.market, &mut failures);

        let fingerprints = features.feature_fingerprints();
        let changed_features = fingerprints
            .iter()
            .filter(|(name, fp)| last.feature_fingerprints.get(*name) != Some(*fp))
            .map(|(name, _)| name.clone())
            .collect();
        last.feature_fingerprints = fingerprints;

        self.seq += 1;
        let snapshot = DashboardSnapshot {
            seq: self.seq,
            fetched_at: Utc::now(),
            source: source.kind(),
            fingerprint: features.fingerprint(),
            features,
            position,
            orders,
            strategy,
            wallet,
            market,
            failures,
            changed_features,
        };
        tracing::debug!(
            seq = snapshot.seq,
            failures = snapshot.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot ready"
        );
        snapshot
    }

    /// Remember a strategy the backend just confirmed.
    pub fn note_strategy(&mut self, config: &StrategyConfig) {
        self.last.strategy = Some(config.clone());
    }
}

/// Commands sent from the UI to the scheduler.
#[derive(Debug)]
pub enum PollCommand {
    Refresh,
    UpdateStrategy(StrategyConfig),
    Shutdown,
}

/// Events sent from the scheduler to the UI.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Snapshot(Box<DashboardSnapshot>),
    /// A manual refresh finished; every fetch has settled.
    RefreshDone,
    StrategyUpdated(StrategyConfig),
    StrategyUpdateFailed(String),
}

/// The scheduler thread has exited; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("poll scheduler stopped")]
pub struct PollerStopped;

/// Handle to the scheduler thread. Dropping it shuts the thread down.
pub struct Poller {
    commands: Sender<PollCommand>,
    events: Receiver<PollEvent>,
    cancel: Arc<AtomicBool>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `source` every `interval`. The first snapshot is fetched
    /// immediately.
    pub fn spawn(source: Box<dyn DataSource>, interval: Duration) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let fetcher = SnapshotFetcher::new().map_err(std::io::Error::other)?;

        let thread_cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("botdash-poller".into())
            .spawn(move || poll_loop(source, fetcher, interval, cmd_rx, evt_tx, thread_cancel))?;

        Ok(Self {
            commands: cmd_tx,
            events: evt_rx,
            cancel,
            interval,
            handle: Some(handle),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn refresh(&self) {
        let _ = self.commands.send(PollCommand::Refresh);
    }

    pub fn update_strategy(&self, config: StrategyConfig) {
        let _ = self.commands.send(PollCommand::UpdateStrategy(config));
    }

    /// Next pending event without blocking. `Ok(None)` means nothing is
    /// pending yet.
    pub fn try_recv(&self) -> Result<Option<PollEvent>, PollerStopped> {
        match self.events.try_recv() {
            Ok(evt) => Ok(Some(evt)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PollerStopped),
        }
    }

    /// Block up to `timeout` for the next event. `Ok(None)` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<PollEvent>, PollerStopped> {
        match self.events.recv_timeout(timeout) {
            Ok(evt) => Ok(Some(evt)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(PollerStopped),
        }
    }

    /// Stop the thread and wait for it.
    pub fn shutdown(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        let _ = self.commands.send(PollCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    source: Box<dyn DataSource>,
    mut fetcher: SnapshotFetcher,
    interval: Duration,
    rx: Receiver<PollCommand>,
    tx: Sender<PollEvent>,
    cancel: Arc<AtomicBool>,
) {
    tracing::info!(source = source.name(), interval_secs = interval.as_secs(), "poller started");
    let mut next_tick = Instant::now();

    loop {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let wait = next_tick.saturating_duration_since(Instant::now());
        let cmd = match rx.recv_timeout(wait) {
            Ok(cmd) => Some(cmd),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match cmd {
            Some(PollCommand::Shutdown) => break,
            None => {
                if !tick(source.as_ref(), &mut fetcher, &tx, &cancel) {
                    break;
                }
                next_tick = Instant::now() + interval;
            }
            Some(PollCommand::Refresh) => {
                if !tick(source.as_ref(), &mut fetcher, &tx, &cancel) {
                    break;
                }
                next_tick = Instant::now() + interval;
                if tx.send(PollEvent::RefreshDone).is_err() {
                    break;
                }
            }
            Some(PollCommand::UpdateStrategy(config)) => {
                let evt = match source.update_strategy(&config) {
                    Ok(stored) => {
                        fetcher.note_strategy(&stored);
                        PollEvent::StrategyUpdated(stored)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "strategy update failed");
                        PollEvent::StrategyUpdateFailed(e.to_string())
                    }
                };
                if tx.send(evt).is_err() {
                    break;
                }
            }
        }
    }
    tracing::info!("poller stopped");
}

/// Fetch and send one snapshot. Returns false once the UI is gone or the
/// poller was cancelled mid-fetch.
fn tick(
    source: &dyn DataSource,
    fetcher: &mut SnapshotFetcher,
    tx: &Sender<PollEvent>,
    cancel: &AtomicBool,
) -> bool {
    let snapshot = fetcher.fetch(source);
    if cancel.load(Ordering::Relaxed) {
        return false;
    }
    tx.send(PollEvent::Snapshot(Box::new(snapshot))).is_ok()
}
