//! Data source trait and structured error types.
//!
//! The dashboard talks to exactly one [`DataSource`], chosen once at start-up
//! by [`select_source`]: the live REST backend or a seeded simulator.

pub mod live;
pub mod simulated;

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DashboardConfig;
use crate::domain::{FeatureSet, MarketPoint, Order, ParamError, Position, StrategyConfig, Wallet};

pub use live::LiveSource;
pub use simulated::SimulatedSource;

/// Structured error types for source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{endpoint} returned HTTP {status}")]
    Http { status: u16, endpoint: String },

    #[error("network error on {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid strategy: {0}")]
    InvalidStrategy(#[from] ParamError),
}

/// Which implementation is behind a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Live,
    Simulated,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Live => "Live Data",
            SourceKind::Simulated => "Demo Mode",
        }
    }
}

/// Everything the dashboard reads, plus the one write (strategy update).
pub trait DataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn kind(&self) -> SourceKind;

    fn features(&self) -> Result<FeatureSet, SourceError>;

    /// The open position, or `None` when flat.
    fn position(&self) -> Result<Option<Position>, SourceError>;

    fn orders(&self) -> Result<Vec<Order>, SourceError>;

    fn strategy(&self) -> Result<StrategyConfig, SourceError>;

    /// Submit a configuration; returns what the backend stored.
    fn update_strategy(&self, config: &StrategyConfig) -> Result<StrategyConfig, SourceError>;

    fn wallet(&self) -> Result<Wallet, SourceError>;

    fn market(&self) -> Result<Vec<MarketPoint>, SourceError>;

    /// Whether the source answers at all.
    fn probe(&self) -> bool;
}

/// Requested source selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Live,
    Simulated,
    /// Probe the backend once and fall back to the simulator if it is down.
    #[default]
    Auto,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Live => write!(f, "live"),
            SourceMode::Simulated => write!(f, "simulated"),
            SourceMode::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(SourceMode::Live),
            "simulated" | "sim" | "mock" | "demo" => Ok(SourceMode::Simulated),
            "auto" => Ok(SourceMode::Auto),
            other => Err(format!("unknown source mode '{other}' (expected live, simulated, auto)")),
        }
    }
}

/// Build the data source for this session.
///
/// `Auto` waits the configured probe delay, probes the live backend once, and
/// settles on the simulator for the rest of the session if the probe fails.
pub fn select_source(config: &DashboardConfig) -> Result<Box<dyn DataSource>, SourceError> {
    let simulated = || -> Box<dyn DataSource> {
        match config.source.seed {
            Some(seed) => Box::new(SimulatedSource::with_seed(seed)),
            None => Box::new(SimulatedSource::new()),
        }
    };

    match config.source.mode {
        SourceMode::Simulated => {
            tracing::info!("using simulated data source");
            Ok(simulated())
        }
        SourceMode::Live => {
            let live = LiveSource::new(&config.api.base_url, config.api.timeout())?;
            tracing::info!(base_url = %config.api.base_url, "using live data source");
            Ok(Box::new(live))
        }
        SourceMode::Auto => {
            let delay = Duration::from_millis(config.source.probe_delay_ms);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            let live = LiveSource::new(&config.api.base_url, config.api.timeout())?;
            if live.probe() {
                tracing::info!(base_url = %config.api.base_url, "backend reachable, using live data");
                Ok(Box::new(live))
            } else {
                tracing::warn!(
                    base_url = %config.api.base_url,
                    "backend not available, falling back to simulated data"
                );
                Ok(simulated())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing() {
        assert_eq!("LIVE".parse::<SourceMode>().unwrap(), SourceMode::Live);
        assert_eq!("mock".parse::<SourceMode>().unwrap(), SourceMode::Simulated);
        assert_eq!("auto".parse::<SourceMode>().unwrap(), SourceMode::Auto);
        assert!("cloud".parse::<SourceMode>().is_err());
        assert_eq!(SourceMode::default(), SourceMode::Auto);
    }

    #[test]
    fn simulated_mode_needs_no_network() {
        let mut cfg = DashboardConfig::default();
        cfg.source.mode = SourceMode::Simulated;
        cfg.source.seed = Some(7);
        let src = select_source(&cfg).unwrap();
        assert_eq!(src.kind(), SourceKind::Simulated);
    }

    #[test]
    fn auto_falls_back_when_backend_is_down() {
        let mut cfg = DashboardConfig::default();
        cfg.source.mode = SourceMode::Auto;
        cfg.source.probe_delay_ms = 0;
        // Port 9 (discard) on loopback is essentially never listening.
        cfg.api.base_url = "http://127.0.0.1:9".into();
        cfg.api.timeout_secs = 1;
        let src = select_source(&cfg).unwrap();
        assert_eq!(src.kind(), SourceKind::Simulated);
    }

    #[test]
    fn errors_are_displayable() {
        let e = SourceError::Http {
            status: 503,
            endpoint: "/api/orders".into(),
        };
        assert_eq!(e.to_string(), "/api/orders returned HTTP 503");
    }
}
