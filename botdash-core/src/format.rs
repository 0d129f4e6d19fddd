//! Display formatting for metric values, timestamps and money.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TimeSeriesPoint;

/// Format a feature value according to the feature's unit.
///
/// Names containing `Usage` are percentages. The other units apply to exact
/// names only: `Response Time` is milliseconds, `Network Traffic` arrives in
/// KB/s and is shown in MB/s, `Disk I/O` is MB/s.
pub fn format_value(feature: &str, value: f64) -> String {
    if feature.contains("Usage") {
        return format!("{value:.1}%");
    }
    match feature {
        "Response Time" => format!("{value:.0}ms"),
        "Network Traffic" => format!("{:.2}MB/s", value / 1000.0),
        "Disk I/O" => format!("{value:.1}MB/s"),
        _ => format!("{value}"),
    }
}

/// `HH:MM:SS` in local time.
pub fn format_clock(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Axis label for a timestamp, coarser as the timeframe widens.
pub fn format_timestamp(ts: DateTime<Utc>, timeframe: Timeframe) -> String {
    let local = ts.with_timezone(&Local);
    let pattern = match timeframe {
        Timeframe::Hour => "%H:%M:%S",
        Timeframe::Day => "%H:%M",
        Timeframe::Week => "%a %H:%M",
        Timeframe::Month => "%b %d",
        Timeframe::All => "%Y-%m-%d",
    };
    local.format(pattern).to_string()
}

/// `YYYY-MM-DD HH:MM:SS` in local time.
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// `$1,234.56`, `-$12.00`.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// Short price-axis label: `$1.2M`, `$3.4K`, `$950`.
pub fn format_compact_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${value}")
    }
}

/// `+1.23%` / `-0.50%`.
pub fn format_signed_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Chart time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[serde(rename = "1h")]
    Hour,
    #[default]
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "1w")]
    Week,
    #[serde(rename = "1m")]
    Month,
    All,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Hour,
        Timeframe::Day,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Hour => "1H",
            Timeframe::Day => "1D",
            Timeframe::Week => "1W",
            Timeframe::Month => "1M",
            Timeframe::All => "All",
        }
    }

    pub fn window(self) -> Option<Duration> {
        match self {
            Timeframe::Hour => Some(Duration::hours(1)),
            Timeframe::Day => Some(Duration::days(1)),
            Timeframe::Week => Some(Duration::weeks(1)),
            Timeframe::Month => Some(Duration::days(30)),
            Timeframe::All => None,
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// The tail of a chronological series that falls inside this window,
    /// measured back from the newest point.
    pub fn filter(self, points: &[TimeSeriesPoint]) -> &[TimeSeriesPoint] {
        let (Some(window), Some(last)) = (self.window(), points.last()) else {
            return points;
        };
        let cutoff = last.timestamp - window;
        let start = points.partition_point(|p| p.timestamp < cutoff);
        &points[start..]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" => Ok(Timeframe::Hour),
            "1d" => Ok(Timeframe::Day),
            "1w" => Ok(Timeframe::Week),
            "1m" => Ok(Timeframe::Month),
            "all" => Ok(Timeframe::All),
            other => Err(format!("unknown timeframe '{other}' (expected 1h, 1d, 1w, 1m, all)")),
        }
    }
}
