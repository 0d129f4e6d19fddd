//! Botdash Core - domain types, statistics, chart state, data sources, poll scheduler.
//!
//! This crate holds everything the trading-bot dashboard does that is not
//! drawing to a terminal:
//! - Domain types (features, positions, orders, strategy, wallet, market)
//! - Value and timestamp formatting
//! - Statistical analysis of a series (summary, histogram, moving averages)
//! - Advanced chart state: visible window, zoom/pan, pointer mapping, annotations
//! - Data sources (live REST backend, seeded simulator) behind one trait
//! - The poll scheduler that fans out fetches and publishes snapshots
//! - Configuration and logging setup

pub mod analysis;
pub mod chart;
pub mod config;
pub mod domain;
pub mod format;
pub mod logging;
pub mod poller;
pub mod source;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses the poller channel or
    /// lives behind the source trait is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::FeatureSet>();
        require_sync::<domain::FeatureSet>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::StrategyConfig>();
        require_sync::<domain::StrategyConfig>();
        require_send::<domain::Wallet>();
        require_sync::<domain::Wallet>();
        require_send::<domain::MarketPoint>();
        require_sync::<domain::MarketPoint>();

        require_send::<poller::DashboardSnapshot>();
        require_send::<poller::PollEvent>();
        require_send::<poller::PollCommand>();
        require_send::<source::SourceError>();
        require_sync::<source::SourceError>();

        require_send::<source::LiveSource>();
        require_sync::<source::LiveSource>();
        require_send::<source::SimulatedSource>();
        require_sync::<source::SimulatedSource>();

        require_send::<chart::ChartView>();
        require_send::<analysis::SeriesAnalysis>();
    }
}
