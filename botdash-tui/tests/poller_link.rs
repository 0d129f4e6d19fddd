//! AppState fed by a real poll scheduler.

use std::thread;
use std::time::{Duration, Instant};

use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use botdash_core::domain::{FeatureSet, MarketPoint, Order, Position, StrategyConfig, Wallet};
use botdash_core::poller::Poller;
use botdash_core::source::{DataSource, SimulatedSource, SourceError, SourceKind};
use botdash_tui::app::{AppState, ErrorCategory};
use botdash_tui::ui;

const DEADLINE: Duration = Duration::from_secs(10);

/// Drain until `done` holds or the deadline passes.
fn drain_until(app: &mut AppState, poller: &Poller, done: impl Fn(&AppState) -> bool) {
    let started = Instant::now();
    while !done(app) {
        assert!(started.elapsed() < DEADLINE, "condition not reached within {DEADLINE:?}");
        app.drain_poller(poller, Instant::now());
        thread::sleep(Duration::from_millis(10));
    }
}

/// Simulated data, except the features fetch panics.
struct PanickingFeatures(SimulatedSource);

impl DataSource for PanickingFeatures {
    fn name(&self) -> &str {
        "panicking"
    }
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }
    fn features(&self) -> Result<FeatureSet, SourceError> {
        panic!("features endpoint exploded");
    }
    fn position(&self) -> Result<Option<Position>, SourceError> {
        self.0.position()
    }
    fn orders(&self) -> Result<Vec<Order>, SourceError> {
        self.0.orders()
    }
    fn strategy(&self) -> Result<StrategyConfig, SourceError> {
        self.0.strategy()
    }
    fn update_strategy(&self, config: &StrategyConfig) -> Result<StrategyConfig, SourceError> {
        self.0.update_strategy(config)
    }
    fn wallet(&self) -> Result<Wallet, SourceError> {
        self.0.wallet()
    }
    fn market(&self) -> Result<Vec<MarketPoint>, SourceError> {
        self.0.market()
    }
    fn probe(&self) -> bool {
        true
    }
}

#[test]
fn snapshots_flow_into_the_app() {
    let poller =
        Poller::spawn(Box::new(SimulatedSource::with_seed(21)), Duration::from_secs(3600)).unwrap();
    let mut app = AppState::new(SourceKind::Simulated, poller.interval());
    drain_until(&mut app, &poller, |a| a.snapshot.is_some());
    assert!(!app.refreshing);
    assert!(!app.updates_stopped);
    assert_eq!(app.feature_names().len(), 5);
}

#[test]
fn dead_scheduler_shows_an_error() {
    let poller = Poller::spawn(
        Box::new(PanickingFeatures(SimulatedSource::with_seed(22))),
        Duration::from_secs(3600),
    )
    .unwrap();
    let mut app = AppState::new(SourceKind::Live, poller.interval());
    drain_until(&mut app, &poller, |a| a.updates_stopped);

    assert!(!app.refreshing);
    assert_eq!(app.error_history.len(), 1);
    assert_eq!(app.error_history[0].category, ErrorCategory::Fetch);

    // Draining again does not pile up duplicate errors.
    app.drain_poller(&poller, Instant::now());
    assert_eq!(app.error_history.len(), 1);

    let mut terminal = Terminal::new(TestBackend::new(160, 30)).unwrap();
    app.screen = Rect::new(0, 0, 160, 30);
    terminal.draw(|f| ui::draw(f, &mut app)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut screen = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            screen.push_str(buffer[(x, y)].symbol());
        }
    }
    assert!(screen.contains("updates stopped"));
}
