//! Live REST backend.
//!
//! Blocking JSON client against the bot's HTTP API. Every endpoint is a plain
//! GET except the strategy update, which PUTs the full configuration.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{DataSource, SourceError, SourceKind};
use crate::domain::{FeatureSet, MarketPoint, Order, Position, StrategyConfig, Wallet};

pub const FEATURES_PATH: &str = "/api/features";
pub const POSITION_PATH: &str = "/api/position";
pub const ORDERS_PATH: &str = "/api/orders";
pub const STRATEGY_CONFIG_PATH: &str = "/api/strategy-config";
pub const STRATEGY_UPDATE_PATH: &str = "/api/strategy";
pub const WALLET_PATH: &str = "/api/wallet";
pub const MARKET_PATH: &str = "/api/market";

pub struct LiveSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl LiveSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("botdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Network {
                endpoint: base_url.to_string(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| network_error(path, e))?;
        decode(path, resp)
    }

    fn put<T: DeserializeOwned, B: serde::Serialize>(&self, path: &str, body: &B) -> Result<T, SourceError> {
        let url = self.url(path);
        tracing::debug!(%url, "PUT");
        let resp = self
            .client
            .put(&url)
            .json(body)
            .send()
            .map_err(|e| network_error(path, e))?;
        decode(path, resp)
    }
}

fn network_error(path: &str, e: reqwest::Error) -> SourceError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    SourceError::Network {
        endpoint: path.to_string(),
        message,
    }
}

fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::blocking::Response) -> Result<T, SourceError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Http {
            status: status.as_u16(),
            endpoint: path.to_string(),
        });
    }
    resp.json::<T>().map_err(|e| SourceError::Decode {
        endpoint: path.to_string(),
        message: e.to_string(),
    })
}

impl DataSource for LiveSource {
    fn name(&self) -> &str {
        "live"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn features(&self) -> Result<FeatureSet, SourceError> {
        self.get(FEATURES_PATH)
    }

    fn position(&self) -> Result<Option<Position>, SourceError> {
        self.get(POSITION_PATH)
    }

    fn orders(&self) -> Result<Vec<Order>, SourceError> {
        self.get(ORDERS_PATH)
    }

    fn strategy(&self) -> Result<StrategyConfig, SourceError> {
        self.get(STRATEGY_CONFIG_PATH)
    }

    fn update_strategy(&self, config: &StrategyConfig) -> Result<StrategyConfig, SourceError> {
        config.validate()?;
        self.put(STRATEGY_UPDATE_PATH, config)
    }

    fn wallet(&self) -> Result<Wallet, SourceError> {
        self.get(WALLET_PATH)
    }

    fn market(&self) -> Result<Vec<MarketPoint>, SourceError> {
        self.get(MARKET_PATH)
    }

    fn probe(&self) -> bool {
        match self.client.get(self.url(FEATURES_PATH)).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "probe failed");
                false
            }
        }
    }
}
