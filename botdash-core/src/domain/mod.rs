//! Domain types for the dashboard: time series, features, trading state, strategy.

pub mod feature;
pub mod series;
pub mod strategy;
pub mod trading;

pub use feature::{FeaturePoint, FeatureSet};
pub use series::{parse_timestamp, values, TimeSeriesPoint};
pub use strategy::{ParamError, ParamKind, ParamValue, StrategyConfig, StrategyParameter};
pub use trading::{MarketPoint, Order, OrderSide, OrderStatus, OrderType, Position, Wallet};
