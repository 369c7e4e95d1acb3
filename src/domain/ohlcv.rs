//! Price bars, series and interval labels.

use crate::domain::error::ScreenerError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A bar granularity label such as `5min`, `1h` or `1d`.
///
/// The label doubles as the storage folder name, so it is kept verbatim:
/// `5m` and `5min` have the same duration but name different folders.
/// Longest interval accepted: one hundred 366-day years.
pub const MAX_INTERVAL_MINUTES: i64 = 100 * 366 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval {
    label: String,
    minutes: i64,
}

impl Interval {
    pub fn parse(label: &str) -> Result<Self, ScreenerError> {
        let label = label.trim();
        let invalid = |reason: &str| ScreenerError::InvalidInterval {
            label: label.to_string(),
            reason: reason.to_string(),
        };

        let split = label
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid("missing unit (expected m, min, h, d or w)"))?;
        let (count, unit) = label.split_at(split);
        let count: i64 = count
            .parse()
            .map_err(|_| invalid("bar count must be a whole number before the unit"))?;
        if count < 1 {
            return Err(invalid("bar count must be at least 1"));
        }

        let unit_minutes = match unit {
            "m" | "min" => 1,
            "h" => 60,
            "d" => 60 * 24,
            "w" => 60 * 24 * 7,
            _ => return Err(invalid("unknown unit (expected m, min, h, d or w)")),
        };

        let minutes = count
            .checked_mul(unit_minutes)
            .filter(|m| *m <= MAX_INTERVAL_MINUTES)
            .ok_or_else(|| invalid("interval is too long"))?;

        Ok(Self {
            label: label.to_string(),
            minutes,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes)
    }

    pub fn is_intraday(&self) -> bool {
        self.minutes < 60 * 24
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for Interval {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}

impl TryFrom<String> for Interval {
    type Error = ScreenerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Interval::parse(&value)
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.label
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String,
    pub interval: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }
}

/// Bars of one (symbol, interval) pair, ordered by strictly increasing timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub interval: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Number of trailing bars to scan for a signal, clamped to the series length.
    pub fn window(&self, duration: usize) -> usize {
        duration.min(self.bars.len())
    }
}
