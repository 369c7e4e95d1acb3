#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime};
use screener::domain::candlestick::PatternTaxonomy;
use screener::domain::chain::{PredicateChain, PredicateStep};
use screener::domain::error::{PredicateError, ScreenerError};
use screener::domain::ohlcv::{Interval, PriceSeries};
pub use screener::domain::ohlcv::PriceBar;
use screener::domain::predicate::{PredicateLibrary, StepParams};
use screener::ports::data_port::DataPort;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Key = (String, String);

/// In-memory `DataPort` keyed by (symbol, interval) that counts loads.
#[derive(Default)]
pub struct MockDataPort {
    pub data: HashMap<Key, Vec<PriceBar>>,
    pub errors: HashMap<Key, String>,
    loads: Mutex<Vec<Key>>,
    stored: Mutex<Vec<PriceSeries>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, interval: &str, bars: Vec<PriceBar>) -> Self {
        self.data
            .insert((symbol.to_string(), interval.to_string()), bars);
        self
    }

    /// Makes every load of (symbol, interval) fail as malformed data.
    pub fn with_error(mut self, symbol: &str, interval: &str, reason: &str) -> Self {
        self.errors.insert(
            (symbol.to_string(), interval.to_string()),
            reason.to_string(),
        );
        self
    }

    pub fn load_count(&self, symbol: &str, interval: &str) -> usize {
        self.loads
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, i)| s == symbol && i == interval)
            .count()
    }

    pub fn total_loads(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    pub fn stored(&self) -> Vec<PriceSeries> {
        self.stored.lock().unwrap().clone()
    }
}

impl DataPort for MockDataPort {
    fn load(&self, symbol: &str, interval: &str) -> Result<Option<PriceSeries>, ScreenerError> {
        let key = (symbol.to_string(), interval.to_string());
        self.loads.lock().unwrap().push(key.clone());
        if let Some(reason) = self.errors.get(&key) {
            return Err(ScreenerError::DataMalformed {
                path: format!("{interval}/{interval}-{symbol}.csv"),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(&key)
            .map(|bars| PriceSeries::new(symbol, interval, bars.clone())))
    }

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, ScreenerError> {
        let mut symbols: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .filter(|(_, i)| i == interval)
            .map(|(s, _)| s.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn store(&self, series: &PriceSeries) -> Result<(), ScreenerError> {
        self.stored.lock().unwrap().push(series.clone());
        Ok(())
    }
}

pub fn timestamp(ts: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn make_bar(symbol: &str, interval: &str, ts: &str, close: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        interval: interval.to_string(),
        timestamp: timestamp(ts),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// `count` bars spaced `step_minutes` apart, close moving by `slope` per bar.
pub fn generate_bars(
    symbol: &str,
    interval: &str,
    start: &str,
    step_minutes: i64,
    count: usize,
    start_price: f64,
    slope: f64,
) -> Vec<PriceBar> {
    let start = timestamp(start);
    (0..count)
        .map(|i| {
            let close = start_price + slope * i as f64;
            PriceBar {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
                timestamp: start + Duration::minutes(step_minutes * i as i64),
                open: close - slope / 2.0,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

pub fn daily_bars(symbol: &str, count: usize, start_price: f64, slope: f64) -> Vec<PriceBar> {
    generate_bars(
        symbol,
        "1d",
        "2024-01-01 00:00:00",
        24 * 60,
        count,
        start_price,
        slope,
    )
}

/// Standard predicates plus deterministic helpers for chain tests.
pub fn test_library() -> PredicateLibrary {
    PredicateLibrary::standard(Arc::new(PatternTaxonomy::standard()))
        .with("always_true", |_, _, _| Ok(true))
        .with("always_false", |_, _, _| Ok(false))
        .with("always_errors", |_, _, _| {
            Err(PredicateError::Data {
                reason: "indicator blew up".to_string(),
            })
        })
        .with("close_above", |series, params, _| {
            params.ensure_only(&["threshold"])?;
            let threshold = params.f64_or("threshold", 0.0)?;
            Ok(series.last().is_some_and(|bar| bar.close > threshold))
        })
}

pub fn step(name: &str, interval: &str) -> PredicateStep {
    PredicateStep::new(name, Interval::parse(interval).unwrap())
}

pub fn step_with(name: &str, interval: &str, params: StepParams) -> PredicateStep {
    step(name, interval).with_params(params)
}

pub fn chain(steps: Vec<PredicateStep>) -> PredicateChain {
    PredicateChain::new(steps)
}
