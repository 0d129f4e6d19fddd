//! Trading state reported by the bot: position, orders, wallet, market tape.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::series::{wire_timestamp, TimeSeriesPoint};

/// The bot's open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub pnl: f64,
    pub pnl_percentage: f64,
    #[serde(with = "wire_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Build a position and derive P&L from entry and current price.
    pub fn open(
        symbol: impl Into<String>,
        quantity: f64,
        entry_price: f64,
        current_price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let pnl = quantity * (current_price - entry_price);
        let cost = quantity * entry_price;
        let pnl_percentage = if cost != 0.0 { pnl / cost.abs() * 100.0 } else { 0.0 };
        Self {
            symbol: symbol.into(),
            quantity,
            entry_price,
            current_price,
            pnl,
            pnl_percentage,
            timestamp,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "Market"),
            OrderType::Limit => write!(f, "Limit"),
            OrderType::Stop => write!(f, "Stop"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Filled,
    #[serde(alias = "cancelled")]
    Canceled,
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "Open"),
            OrderStatus::Filled => write!(f, "Filled"),
            OrderStatus::Canceled => write!(f, "Canceled"),
            OrderStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A recent order as listed by `GET /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: f64,
    pub price: f64,
    pub status: OrderStatus,
    #[serde(with = "wire_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Order {
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }
}

/// Wallet overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub balance: f64,
    pub available: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
    #[serde(with = "wire_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Wallet {
    /// Funds tied up in open orders and positions.
    pub fn in_use(&self) -> f64 {
        (self.balance - self.available).max(0.0)
    }
}

/// One market tick: price plus optional volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPoint {
    #[serde(with = "wire_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl From<&MarketPoint> for TimeSeriesPoint {
    fn from(p: &MarketPoint) -> Self {
        let mut point = TimeSeriesPoint::new(p.timestamp, p.value);
        if let Some(volume) = p.volume {
            point.extra.insert("volume".into(), serde_json::json!(volume));
        }
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_derives_pnl() {
        let ts = Utc::now();
        let p = Position::open("BTC/USD", 2.0, 100.0, 110.0, ts);
        assert_eq!(p.pnl, 20.0);
        assert!((p.pnl_percentage - 10.0).abs() < 1e-9);
        assert!(p.is_profitable());
        assert_eq!(p.market_value(), 220.0);
    }

    #[test]
    fn order_wire_format() {
        let json = r#"{"id":"o-1","symbol":"ETH/USD","side":"sell","type":"limit",
            "quantity":1.5,"price":2000.0,"status":"cancelled","timestamp":1704067200000}"#;
        let o: Order = serde_json::from_str(json).unwrap();
        assert_eq!(o.side, OrderSide::Sell);
        assert_eq!(o.order_type, OrderType::Limit);
        assert_eq!(o.status, OrderStatus::Canceled);
        assert_eq!(o.notional(), 3000.0);

        let back = serde_json::to_value(&o).unwrap();
        assert_eq!(back["type"], "limit");
        assert_eq!(back["status"], "canceled");
    }

    #[test]
    fn null_position_is_none() {
        let p: Option<Position> = serde_json::from_str("null").unwrap();
        assert!(p.is_none());
    }

    #[test]
    fn wallet_camel_case() {
        let json = r#"{"balance":1000.0,"available":400.0,"profitLoss":-12.5,
            "profitLossPercentage":-1.25,"lastUpdated":"2024-01-01T00:00:00Z"}"#;
        let w: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(w.in_use(), 600.0);
        assert_eq!(w.profit_loss, -12.5);
    }

    #[test]
    fn market_point_carries_volume() {
        let m = MarketPoint {
            timestamp: Utc::now(),
            value: 42.0,
            volume: Some(7.0),
        };
        let p = TimeSeriesPoint::from(&m);
        assert_eq!(p.extra_f64("volume"), Some(7.0));
    }
}
