//! Simulated data source.
//!
//! Generates plausible random data for every endpoint so the dashboard is
//! usable without a backend. Each generator draws from its own RNG, derived
//! from the master seed, the data kind and how many times that kind has been
//! requested. Results are therefore reproducible for a given seed no matter
//! in which order the poller's parallel fetches run.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DataSource, SourceError, SourceKind};
use crate::domain::{
    FeaturePoint, FeatureSet, MarketPoint, Order, OrderSide, OrderStatus, OrderType, Position,
    StrategyConfig, StrategyParameter, Wallet,
};

/// Feature names produced by the simulator.
pub const FEATURE_NAMES: [&str; 5] = [
    "CPU Usage",
    "Memory Usage",
    "Network Traffic",
    "Disk I/O",
    "Response Time",
];

pub const FEATURE_POINTS: usize = 20;
pub const FEATURE_SPACING_SECS: i64 = 30;
pub const ORDER_COUNT: usize = 6;
pub const MARKET_POINTS: usize = 100;

struct SimState {
    strategy: StrategyConfig,
    draws: BTreeMap<&'static str, u64>,
}

pub struct SimulatedSource {
    master_seed: u64,
    state: Mutex<SimState>,
}

impl SimulatedSource {
    /// Randomly seeded simulator.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(master_seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(master_seed);
        Self {
            master_seed,
            state: Mutex::new(SimState {
                strategy: default_strategy(&mut rng),
                draws: BTreeMap::new(),
            }),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        // A panic while holding the lock cannot leave SimState half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fresh RNG for the next draw of `kind`.
    fn rng_for(&self, kind: &'static str) -> StdRng {
        let draw = {
            let mut state = self.lock();
            let counter = state.draws.entry(kind).or_insert(0);
            let n = *counter;
            *counter += 1;
            n
        };
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(kind.as_bytes());
        hasher.update(&draw.to_le_bytes());
        let hash = hasher.finalize();
        let mut seed = [0u8; 32];
        seed.copy_from_slice(hash.as_bytes());
        StdRng::from_seed(seed)
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Upper bound of a feature's simulated range.
pub fn feature_ceiling(name: &str) -> f64 {
    if name.contains("Usage") {
        100.0
    } else if name == "Response Time" {
        500.0
    } else {
        1000.0
    }
}

pub fn generate_features(rng: &mut impl Rng) -> FeatureSet {
    let now = Utc::now();
    let mut set = FeatureSet::new();
    for name in FEATURE_NAMES {
        let ceiling = feature_ceiling(name);
        let points = (0..FEATURE_POINTS)
            .rev()
            .map(|i| FeaturePoint {
                name: name.to_string(),
                value: round2(rng.gen_range(0.0..ceiling)),
                timestamp: now - Duration::seconds(i as i64 * FEATURE_SPACING_SECS),
            })
            .collect();
        set.insert(name, points);
    }
    set
}

pub fn generate_position(rng: &mut impl Rng) -> Position {
    let entry = round2(rng.gen_range(40_000.0..50_000.0));
    let current = round2(entry * (1.0 + rng.gen_range(-0.05..0.05)));
    let quantity = round2(rng.gen_range(0.1..2.0));
    Position::open("BTC/USD", quantity, entry, current, Utc::now())
}

pub fn generate_orders(rng: &mut impl Rng) -> Vec<Order> {
    let now = Utc::now();
    (0..ORDER_COUNT)
        .map(|i| {
            let side = if rng.gen_bool(0.5) {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            };
            let order_type = match rng.gen_range(0..3) {
                0 => OrderType::Market,
                1 => OrderType::Limit,
                _ => OrderType::Stop,
            };
            let status = match rng.gen_range(0..10) {
                0..=5 => OrderStatus::Filled,
                6..=7 => OrderStatus::Open,
                8 => OrderStatus::Canceled,
                _ => OrderStatus::Rejected,
            };
            Order {
                id: format!("ord-{:06}", rng.gen_range(0..1_000_000)),
                symbol: "BTC/USD".to_string(),
                side,
                order_type,
                quantity: round2(rng.gen_range(0.01..1.5)),
                price: round2(rng.gen_range(40_000.0..50_000.0)),
                status,
                timestamp: now - Duration::minutes(i as i64 * 15),
            }
        })
        .collect()
}

pub fn generate_wallet(rng: &mut impl Rng) -> Wallet {
    let balance = round2(10_000.0 + rng.gen_range(-1_500.0..2_500.0));
    let available = round2(balance * rng.gen_range(0.3..0.9));
    let profit_loss = round2(balance - 10_000.0);
    Wallet {
        balance,
        available,
        profit_loss,
        profit_loss_percentage: round2(profit_loss / 10_000.0 * 100.0),
        last_updated: Utc::now(),
    }
}

/// Random-walk price with volume, one point per minute ending now.
pub fn generate_market(rng: &mut impl Rng) -> Vec<MarketPoint> {
    let now = Utc::now();
    let mut price: f64 = rng.gen_range(40_000.0..50_000.0);
    (0..MARKET_POINTS)
        .rev()
        .map(|i| {
            price = (price * (1.0 + rng.gen_range(-0.01..0.01))).max(1.0);
            MarketPoint {
                timestamp: now - Duration::minutes(i as i64),
                value: round2(price),
                volume: Some(round2(rng.gen_range(10.0..1_000.0))),
            }
        })
        .collect()
}

fn default_strategy(rng: &mut impl Rng) -> StrategyConfig {
    let mut parameters = BTreeMap::new();
    parameters.insert(
        "rsiPeriod".to_string(),
        StrategyParameter::number(14.0, 2.0, 50.0, "Lookback period for the RSI indicator"),
    );
    parameters.insert(
        "overbought".to_string(),
        StrategyParameter::number(70.0, 50.0, 95.0, "RSI level treated as overbought"),
    );
    parameters.insert(
        "oversold".to_string(),
        StrategyParameter::number(30.0, 5.0, 50.0, "RSI level treated as oversold"),
    );
    parameters.insert(
        "stopLossPct".to_string(),
        StrategyParameter::number(2.5, 0.5, 10.0, "Stop loss distance in percent"),
    );
    parameters.insert(
        "trailingStop".to_string(),
        StrategyParameter::boolean(true, "Move the stop loss with the price"),
    );
    parameters.insert(
        "tradingPair".to_string(),
        StrategyParameter::string("BTC/USD", "Pair the strategy trades"),
    );
    StrategyConfig {
        id: format!("strat-{:04}", rng.gen_range(0..10_000)),
        name: "RSI Mean Reversion".to_string(),
        description: "Buys oversold and sells overbought conditions on the RSI".to_string(),
        enabled: true,
        parameters,
        last_updated: Utc::now(),
    }
}

impl DataSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Simulated
    }

    fn features(&self) -> Result<FeatureSet, SourceError> {
        Ok(generate_features(&mut self.rng_for("features")))
    }

    fn position(&self) -> Result<Option<Position>, SourceError> {
        Ok(Some(generate_position(&mut self.rng_for("position"))))
    }

    fn orders(&self) -> Result<Vec<Order>, SourceError> {
        Ok(generate_orders(&mut self.rng_for("orders")))
    }

    fn strategy(&self) -> Result<StrategyConfig, SourceError> {
        Ok(self.lock().strategy.clone())
    }

    fn update_strategy(&self, config: &StrategyConfig) -> Result<StrategyConfig, SourceError> {
        config.validate()?;
        let mut stored = config.clone();
        stored.last_updated = Utc::now();
        self.lock().strategy = stored.clone();
        tracing::info!(name = %stored.name, enabled = stored.enabled, "strategy updated");
        Ok(stored)
    }

    fn wallet(&self) -> Result<Wallet, SourceError> {
        Ok(generate_wallet(&mut self.rng_for("wallet")))
    }

    fn market(&self) -> Result<Vec<MarketPoint>, SourceError> {
        Ok(generate_market(&mut self.rng_for("market")))
    }

    fn probe(&self) -> bool {
        true
    }
}
