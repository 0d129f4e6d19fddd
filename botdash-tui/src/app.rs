//! Application state - single-owner, main-thread only.
//!
//! All TUI state lives here. The poller thread talks to it through
//! [`PollEvent`]s; outgoing work is queued as [`UiRequest`]s for the main
//! loop to forward.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

use botdash_core::analysis::SeriesAnalysis;
use botdash_core::chart::{ChartType, ChartView};
use botdash_core::domain::{ParamError, ParamValue, StrategyConfig, TimeSeriesPoint};
use botdash_core::format::Timeframe;
use botdash_core::poller::{DashboardSnapshot, PollEvent, Poller};
use botdash_core::source::SourceKind;

pub const ERROR_HISTORY_CAP: usize = 50;
/// How long a feature card stays highlighted after its data changed.
pub const FLASH_DURATION: Duration = Duration::from_millis(1500);
/// Feature cards per row on the metrics panel.
pub const METRIC_COLUMNS: usize = 3;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Metrics,
    Trading,
    Strategy,
    Market,
    Help,
}

impl Panel {
    pub const COUNT: usize = 5;

    pub fn index(self) -> usize {
        match self {
            Panel::Metrics => 0,
            Panel::Trading => 1,
            Panel::Strategy => 2,
            Panel::Market => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Metrics),
            1 => Some(Panel::Trading),
            2 => Some(Panel::Strategy),
            3 => Some(Panel::Market),
            4 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Metrics => "Metrics",
            Panel::Trading => "Trading",
            Panel::Strategy => "Strategy",
            Panel::Market => "Market",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Metrics)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Metrics)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fetch,
    Strategy,
    Input,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Fetch => "NET",
            ErrorCategory::Strategy => "STRAT",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// Work the main loop forwards to the poller.
#[derive(Debug, Clone, PartialEq)]
pub enum UiRequest {
    Refresh,
    SaveStrategy(StrategyConfig),
}

/// Metrics panel: cursor over the feature cards plus change highlights.
#[derive(Debug, Default)]
pub struct MetricsPanelState {
    pub cursor: usize,
    pub flash_until: BTreeMap<String, Instant>,
}

impl MetricsPanelState {
    pub fn is_flashing(&self, feature: &str, now: Instant) -> bool {
        self.flash_until.get(feature).is_some_and(|until| now < *until)
    }

    /// Move by `delta` cards, staying on the grid.
    pub fn step(&mut self, delta: isize, count: usize) {
        if count == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        if (0..count as isize).contains(&next) {
            self.cursor = next as usize;
        }
    }
}

#[derive(Debug, Default)]
pub struct TradingPanelState {
    pub order_cursor: usize,
}

/// Strategy panel: an editable draft of the bot's configuration.
///
/// Row 0 is the enabled switch; rows 1.. are parameters in name order.
#[derive(Debug, Default)]
pub struct StrategyPanelState {
    pub draft: Option<StrategyConfig>,
    pub cursor: usize,
    /// The draft has local edits not yet saved.
    pub dirty: bool,
    pub saving: bool,
}

impl StrategyPanelState {
    pub fn row_count(&self) -> usize {
        self.draft.as_ref().map_or(0, |d| d.parameters.len() + 1)
    }

    /// Parameter under the cursor; `None` on the enabled row.
    pub fn selected_param(&self) -> Option<&str> {
        let draft = self.draft.as_ref()?;
        let idx = self.cursor.checked_sub(1)?;
        draft.parameters.keys().nth(idx).map(String::as_str)
    }

    /// Adopt the backend's configuration unless there are unsaved edits.
    pub fn accept_remote(&mut self, remote: Option<&StrategyConfig>) {
        if self.dirty {
            return;
        }
        if let Some(cfg) = remote {
            self.draft = Some(cfg.clone());
        }
        self.cursor = self.cursor.min(self.row_count().saturating_sub(1));
    }

    /// Left/right on the selected row: step a number, flip a boolean.
    pub fn adjust(&mut self, direction: f64) -> Result<(), ParamError> {
        let Some(name) = self.selected_param().map(str::to_string) else {
            return self.toggle();
        };
        let Some(draft) = self.draft.as_mut() else {
            return Ok(());
        };
        let Some(param) = draft.parameters.get(&name) else {
            return Ok(());
        };
        let next = match &param.value {
            ParamValue::Number(v) => {
                let mut n = v + param.step() * direction;
                if let Some(min) = param.min {
                    n = n.max(min);
                }
                if let Some(max) = param.max {
                    n = n.min(max);
                }
                ParamValue::Number((n * 1e6).round() / 1e6)
            }
            ParamValue::Boolean(b) => ParamValue::Boolean(!b),
            ParamValue::String(_) => return Ok(()),
        };
        draft.set_parameter(&name, next)?;
        self.dirty = true;
        Ok(())
    }

    /// Space on the selected row: flip the enabled switch or a boolean.
    pub fn toggle(&mut self) -> Result<(), ParamError> {
        let name = self.selected_param().map(str::to_string);
        let Some(draft) = self.draft.as_mut() else {
            return Ok(());
        };
        match name {
            None => draft.enabled = !draft.enabled,
            Some(name) => {
                if let Some(ParamValue::Boolean(b)) = draft.parameters.get(&name).map(|p| &p.value) {
                    let flipped = !b;
                    draft.set_parameter(&name, ParamValue::Boolean(flipped))?;
                } else {
                    return Ok(());
                }
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Free-text edit of the selected parameter.
    pub fn set_from_input(&mut self, input: &str) -> Result<(), ParamError> {
        let Some(name) = self.selected_param().map(str::to_string) else {
            return Ok(());
        };
        if let Some(draft) = self.draft.as_mut() {
            draft.set_parameter_str(&name, input.trim())?;
            self.dirty = true;
        }
        Ok(())
    }
}

/// Market panel settings.
#[derive(Debug, Default)]
pub struct MarketPanelState {
    pub timeframe: Timeframe,
}

/// Advanced chart overlay tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartTab {
    #[default]
    Chart,
    Stats,
}

impl ChartTab {
    pub fn toggle(self) -> Self {
        match self {
            ChartTab::Chart => ChartTab::Stats,
            ChartTab::Stats => ChartTab::Chart,
        }
    }
}

/// An open advanced chart for one feature.
#[derive(Debug, Clone)]
pub struct ChartOverlay {
    pub view: ChartView,
    pub tab: ChartTab,
    pub analysis: Option<SeriesAnalysis>,
    /// The pointer was over the plot at its last reported position.
    pub pointer_inside: bool,
}

impl ChartOverlay {
    pub fn open(feature: &str, series: Vec<TimeSeriesPoint>, chart_type: ChartType) -> Self {
        let analysis = SeriesAnalysis::compute(&series, feature);
        let mut view = ChartView::new(feature, series);
        view.set_chart_type(chart_type);
        Self {
            view,
            tab: ChartTab::default(),
            analysis,
            pointer_inside: false,
        }
    }

    pub fn replace_series(&mut self, series: Vec<TimeSeriesPoint>) {
        self.analysis = SeriesAnalysis::compute(&series, self.view.feature());
        self.view.replace_series(series);
        self.pointer_inside = false;
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Chart,
    ErrorHistory,
    EditParam(String),
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Data
    pub snapshot: Option<Box<DashboardSnapshot>>,
    pub source: SourceKind,

    // Panel states
    pub metrics: MetricsPanelState,
    pub trading: TradingPanelState,
    pub strategy: StrategyPanelState,
    pub market: MarketPanelState,
    pub chart: Option<ChartOverlay>,
    pub chart_type: ChartType,

    // Refresh schedule
    pub interval: Duration,
    pub next_refresh: Instant,
    pub refreshing: bool,
    /// The poll scheduler exited; no more data will arrive.
    pub updates_stopped: bool,
    pub requests: Vec<UiRequest>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub edit_input: String,
    /// Terminal area as of the last draw.
    pub screen: Rect,
}

impl AppState {
    pub fn new(source: SourceKind, interval: Duration) -> Self {
        Self {
            active_panel: Panel::Metrics,
            running: true,
            snapshot: None,
            source,
            metrics: MetricsPanelState::default(),
            trading: TradingPanelState::default(),
            strategy: StrategyPanelState::default(),
            market: MarketPanelState::default(),
            chart: None,
            chart_type: ChartType::default(),
            interval,
            next_refresh: Instant::now() + interval,
            refreshing: true,
            updates_stopped: false,
            requests: Vec::new(),
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            edit_input: String::new(),
            screen: Rect::default(),
        }
    }

    /// Push an error to the history, capping at [`ERROR_HISTORY_CAP`].
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        tracing::warn!(category = category.label(), %context, "{message}");
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// Feature names in display order.
    pub fn feature_names(&self) -> Vec<String> {
        self.snapshot
            .as_ref()
            .map(|s| s.features.names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn selected_feature(&self) -> Option<String> {
        self.feature_names().into_iter().nth(self.metrics.cursor)
    }

    /// Time until the next scheduled poll.
    pub fn refresh_countdown(&self, now: Instant) -> Duration {
        self.next_refresh.saturating_duration_since(now)
    }

    pub fn request_refresh(&mut self) {
        if self.updates_stopped {
            self.set_warning("Data updates stopped; restart to reconnect");
            return;
        }
        if self.refreshing {
            return;
        }
        self.refreshing = true;
        self.requests.push(UiRequest::Refresh);
        self.set_status("Refreshing...");
    }

    /// Validate the strategy draft and queue it for saving.
    pub fn save_strategy(&mut self) {
        let Some(draft) = self.strategy.draft.clone() else {
            self.set_warning("No strategy loaded yet");
            return;
        };
        if let Err(e) = draft.validate() {
            self.push_error(ErrorCategory::Strategy, e.to_string(), draft.name.clone());
            return;
        }
        if self.updates_stopped {
            self.set_warning("Data updates stopped; strategy not saved");
            return;
        }
        self.strategy.saving = true;
        self.requests.push(UiRequest::SaveStrategy(draft));
        self.set_status("Saving strategy...");
    }

    /// Drop local edits and go back to the last fetched configuration.
    pub fn revert_strategy(&mut self) {
        self.strategy.dirty = false;
        let remote = self.snapshot.as_ref().and_then(|s| s.strategy.clone());
        self.strategy.accept_remote(remote.as_ref());
        self.set_status("Strategy edits discarded");
    }

    /// Open the advanced chart for the feature under the metrics cursor.
    pub fn open_chart(&mut self) {
        let Some(feature) = self.selected_feature() else {
            return;
        };
        let series = self
            .snapshot
            .as_ref()
            .map(|s| s.features.series(&feature))
            .unwrap_or_default();
        self.chart = Some(ChartOverlay::open(&feature, series, self.chart_type));
        self.overlay = Overlay::Chart;
    }

    pub fn close_chart(&mut self) {
        self.chart = None;
        self.overlay = Overlay::None;
    }

    pub fn take_requests(&mut self) -> Vec<UiRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn handle_poll_event(&mut self, event: PollEvent, now: Instant) {
        match event {
            PollEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot, now),
            PollEvent::RefreshDone => {
                self.refreshing = false;
                self.set_status("Data refreshed");
            }
            PollEvent::StrategyUpdated(cfg) => {
                self.strategy.saving = false;
                self.strategy.dirty = false;
                let name = cfg.name.clone();
                self.strategy.accept_remote(Some(&cfg));
                if let Some(snapshot) = self.snapshot.as_mut() {
                    snapshot.strategy = Some(cfg);
                }
                self.set_status(format!("Strategy \"{name}\" saved"));
            }
            PollEvent::StrategyUpdateFailed(message) => {
                self.strategy.saving = false;
                self.push_error(ErrorCategory::Strategy, message, "strategy update".into());
            }
        }
    }

    /// Apply every event the poller has queued so far.
    pub fn drain_poller(&mut self, poller: &Poller, now: Instant) {
        loop {
            match poller.try_recv() {
                Ok(Some(evt)) => self.handle_poll_event(evt, now),
                Ok(None) => break,
                Err(_) => {
                    self.mark_updates_stopped();
                    break;
                }
            }
        }
    }

    /// The scheduler thread is gone. Recorded once; later calls are no-ops.
    pub fn mark_updates_stopped(&mut self) {
        if self.updates_stopped {
            return;
        }
        tracing::error!("poll scheduler exited, no more data will arrive");
        self.updates_stopped = true;
        self.refreshing = false;
        self.strategy.saving = false;
        self.push_error(
            ErrorCategory::Fetch,
            "Data updates stopped: poll scheduler exited".into(),
            "poller".into(),
        );
    }

    fn apply_snapshot(&mut self, snapshot: Box<DashboardSnapshot>, now: Instant) {
        for failure in &snapshot.failures {
            self.push_error(
                ErrorCategory::Fetch,
                failure.to_string(),
                format!("tick #{}", snapshot.seq),
            );
        }
        for name in &snapshot.changed_features {
            self.metrics.flash_until.insert(name.clone(), now + FLASH_DURATION);
        }
        self.strategy.accept_remote(snapshot.strategy.as_ref());

        if let Some(chart) = self.chart.as_mut() {
            let feature = chart.view.feature().to_string();
            if snapshot.changed_features.contains(&feature) {
                chart.replace_series(snapshot.features.series(&feature));
            }
        }

        let feature_count = snapshot.features.len();
        if self.metrics.cursor >= feature_count {
            self.metrics.cursor = feature_count.saturating_sub(1);
        }
        let order_count = snapshot.orders.len();
        if self.trading.order_cursor >= order_count {
            self.trading.order_cursor = order_count.saturating_sub(1);
        }

        self.source = snapshot.source;
        self.next_refresh = now + self.interval;
        // The first snapshot also ends the start-up fetch.
        if snapshot.seq == 1 {
            self.refreshing = false;
        }
        self.snapshot = Some(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use botdash_core::domain::StrategyParameter;
    use botdash_core::poller::SnapshotFetcher;
    use botdash_core::source::SimulatedSource;

    fn app_with_snapshot(seed: u64) -> AppState {
        let mut app = AppState::new(SourceKind::Simulated, Duration::from_secs(10));
        let mut fetcher = SnapshotFetcher::new().unwrap();
        let snap = fetcher.fetch(&SimulatedSource::with_seed(seed));
        app.handle_poll_event(PollEvent::Snapshot(Box::new(snap)), Instant::now());
        app
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Metrics.next(), Panel::Trading);
        assert_eq!(Panel::Help.next(), Panel::Metrics);
        assert_eq!(Panel::Metrics.prev(), Panel::Help);
        assert_eq!(Panel::Trading.prev(), Panel::Metrics);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..Panel::COUNT {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(Panel::COUNT).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let mut app = AppState::new(SourceKind::Simulated, Duration::from_secs(10));
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), ERROR_HISTORY_CAP);
        assert!(app.error_history[0].message.contains("59"));
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);
    }

    #[test]
    fn first_snapshot_flashes_every_feature() {
        let app = app_with_snapshot(1);
        let now = Instant::now();
        for name in app.feature_names() {
            assert!(app.metrics.is_flashing(&name, now));
        }
        assert!(!app.metrics.is_flashing("CPU Usage", now + FLASH_DURATION * 2));
        assert!(!app.refreshing);
    }

    #[test]
    fn failures_become_errors() {
        let mut app = AppState::new(SourceKind::Live, Duration::from_secs(10));
        let mut fetcher = SnapshotFetcher::new().unwrap();
        let mut snap = fetcher.fetch(&SimulatedSource::with_seed(2));
        snap.failures.push(botdash_core::poller::FetchFailure {
            kind: botdash_core::poller::DataKind::Wallet,
            message: "timeout".into(),
        });
        app.handle_poll_event(PollEvent::Snapshot(Box::new(snap)), Instant::now());
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Fetch);
        assert!(app.error_history[0].message.contains("wallet"));
    }

    #[test]
    fn countdown_restarts_on_snapshot() {
        let app = app_with_snapshot(3);
        let now = Instant::now();
        let left = app.refresh_countdown(now);
        assert!(left <= Duration::from_secs(10));
        assert!(left > Duration::from_secs(8));
    }

    #[test]
    fn refresh_is_not_queued_twice() {
        let mut app = app_with_snapshot(4);
        app.request_refresh();
        app.request_refresh();
        assert_eq!(app.take_requests(), vec![UiRequest::Refresh]);
        app.handle_poll_event(PollEvent::RefreshDone, Instant::now());
        assert!(!app.refreshing);
    }

    #[test]
    fn stopped_updates_are_recorded_once() {
        let mut app = app_with_snapshot(5);
        app.request_refresh();
        app.take_requests();
        assert!(app.refreshing);

        app.mark_updates_stopped();
        app.mark_updates_stopped();
        assert!(app.updates_stopped);
        assert!(!app.refreshing);
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Fetch);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);

        // Nothing is queued for a scheduler that cannot answer.
        app.request_refresh();
        app.save_strategy();
        assert!(app.take_requests().is_empty());
        assert!(!app.strategy.saving);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn metrics_cursor_stays_on_grid() {
        let mut m = MetricsPanelState::default();
        m.step(-1, 5);
        assert_eq!(m.cursor, 0);
        m.step(METRIC_COLUMNS as isize, 5);
        assert_eq!(m.cursor, 3);
        m.step(METRIC_COLUMNS as isize, 5);
        assert_eq!(m.cursor, 3);
        m.step(1, 5);
        assert_eq!(m.cursor, 4);
    }

    #[test]
    fn open_chart_for_selected_feature() {
        let mut app = app_with_snapshot(5);
        app.metrics.cursor = 1;
        let expected = app.feature_names()[1].clone();
        app.open_chart();
        assert_eq!(app.overlay, Overlay::Chart);
        let chart = app.chart.as_ref().unwrap();
        assert_eq!(chart.view.feature(), expected);
        assert!(chart.analysis.is_some());
        app.close_chart();
        assert!(app.chart.is_none());
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn chart_follows_changed_feature() {
        let mut app = app_with_snapshot(6);
        app.open_chart();
        let feature = app.chart.as_ref().unwrap().view.feature().to_string();
        let mut fetcher = SnapshotFetcher::new().unwrap();
        let mut snap = fetcher.fetch(&SimulatedSource::with_seed(99));
        snap.changed_features = BTreeSet::from([feature.clone()]);
        let fresh = snap.features.series(&feature);
        app.handle_poll_event(PollEvent::Snapshot(Box::new(snap)), Instant::now());
        assert_eq!(app.chart.as_ref().unwrap().view.series(), fresh.as_slice());
    }

    fn sample_strategy() -> StrategyConfig {
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "period".to_string(),
            StrategyParameter::number(20.0, 5.0, 25.0, "Lookback"),
        );
        parameters.insert("trailing".to_string(), StrategyParameter::boolean(false, "Trail"));
        StrategyConfig {
            id: "s".into(),
            name: "Breakout".into(),
            description: String::new(),
            enabled: true,
            parameters,
            last_updated: chrono::Utc::now(),
        }
    }

    #[test]
    fn strategy_adjust_steps_and_clamps() {
        let mut s = StrategyPanelState::default();
        s.accept_remote(Some(&sample_strategy()));
        s.cursor = 1; // period, step = 1
        s.adjust(1.0).unwrap();
        let value = |s: &StrategyPanelState| s.draft.as_ref().unwrap().parameters["period"].value.clone();
        assert_eq!(value(&s), ParamValue::Number(21.0));
        for _ in 0..10 {
            s.adjust(1.0).unwrap();
        }
        assert_eq!(value(&s), ParamValue::Number(25.0));
        assert!(s.dirty);
    }

    #[test]
    fn strategy_toggle_rows() {
        let mut s = StrategyPanelState::default();
        s.accept_remote(Some(&sample_strategy()));
        s.cursor = 0;
        s.toggle().unwrap();
        assert!(!s.draft.as_ref().unwrap().enabled);
        s.cursor = 2;
        s.toggle().unwrap();
        assert_eq!(
            s.draft.as_ref().unwrap().parameters["trailing"].value,
            ParamValue::Boolean(true)
        );
    }

    #[test]
    fn dirty_draft_survives_refresh() {
        let mut s = StrategyPanelState::default();
        s.accept_remote(Some(&sample_strategy()));
        s.cursor = 1;
        s.set_from_input("7").unwrap();
        s.accept_remote(Some(&sample_strategy()));
        assert_eq!(
            s.draft.as_ref().unwrap().parameters["period"].value,
            ParamValue::Number(7.0)
        );
        assert!(s.set_from_input("500").is_err());
    }

    #[test]
    fn invalid_draft_is_not_queued() {
        let mut app = AppState::new(SourceKind::Simulated, Duration::from_secs(10));
        let mut cfg = sample_strategy();
        cfg.parameters.get_mut("period").unwrap().value = ParamValue::Number(99.0);
        app.strategy.draft = Some(cfg);
        app.save_strategy();
        assert!(app.take_requests().is_empty());
        assert_eq!(app.error_history[0].category, ErrorCategory::Strategy);
    }

    #[test]
    fn saved_strategy_clears_dirty() {
        let mut app = AppState::new(SourceKind::Simulated, Duration::from_secs(10));
        app.strategy.accept_remote(Some(&sample_strategy()));
        app.strategy.dirty = true;
        app.save_strategy();
        let requests = app.take_requests();
        let Some(UiRequest::SaveStrategy(cfg)) = requests.first() else {
            panic!("expected a save request, got {requests:?}");
        };
        app.handle_poll_event(PollEvent::StrategyUpdated(cfg.clone()), Instant::now());
        assert!(!app.strategy.dirty);
        assert!(!app.strategy.saving);
    }
}
