//! Botdash TUI - terminal dashboard for a running trading bot.
//!
//! Panels:
//! 1. Metrics - one card per bot feature with sparkline and latest change
//! 2. Trading - open position, wallet balances, recent orders
//! 3. Strategy - view and edit the bot's strategy parameters
//! 4. Market - price history with timeframe selector and volume
//! 5. Help - keyboard and mouse reference
//!
//! Enter on a metric card opens the advanced chart: zoom, pan, range slider,
//! trend and reference line drawing, plus a statistics tab.

pub mod app;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;

pub use app::AppState;
pub use input::{handle_key, handle_mouse};
