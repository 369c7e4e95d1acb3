//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 bars

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
}

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = macd_values(&closes, fast, slow, signal_period)
        .into_iter()
        .zip(bars)
        .map(|(point, bar)| {
            let (line, signal) = point.map(|p| (p.line, p.signal)).unwrap_or((0.0, 0.0));
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: point.is_some(),
                value: IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Macd {
            fast,
            slow,
            signal: signal_period,
        },
        values,
    }
}

/// MACD line and signal per input value; `None` until both are defined.
pub fn macd_values(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<Option<MacdPoint>> {
    let mut out = vec![None; closes.len()];
    if fast == 0 || slow == 0 || signal_period == 0 {
        return out;
    }

    let ema_fast = ema_values(closes, fast);
    let ema_slow = ema_values(closes, slow);
    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let Some(first) = line.iter().position(Option::is_some) else {
        return out;
    };
    let defined: Vec<f64> = line[first..].iter().map(|v| v.unwrap_or(0.0)).collect();
    let signal = ema_values(&defined, signal_period);

    for (offset, sig) in signal.into_iter().enumerate() {
        if let Some(sig) = sig {
            out[first + offset] = Some(MacdPoint {
                line: defined[offset],
                signal: sig,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rising(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_warmup_default() {
        let values = macd_values(&rising(40), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);

        let warmup = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;
        for (i, v) in values.iter().enumerate().take(warmup) {
            assert!(v.is_none(), "Index {} should not be valid", i);
        }
        assert!(values[warmup].is_some(), "Index {} should be valid", warmup);
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let values = macd_values(&closes, 3, 5, 2);

        let ema_fast = ema_values(&closes, 3);
        let ema_slow = ema_values(&closes, 5);

        for (i, point) in values.iter().enumerate() {
            if let Some(p) = point {
                let expected = ema_fast[i].unwrap() - ema_slow[i].unwrap();
                assert!((p.line - expected).abs() < 1e-12, "mismatch at {}", i);
            }
        }
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let bars: Vec<PriceBar> = rising(40)
            .into_iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                symbol: "TEST".into(),
                interval: "1d".into(),
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect();

        let series = calculate_macd(&bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        for point in series.values.iter().filter(|p| p.valid) {
            if let IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } = point.value
            {
                assert!((histogram - (line - signal)).abs() < f64::EPSILON);
            } else {
                panic!("Expected Macd value");
            }
        }
    }

    #[test]
    fn macd_zero_period() {
        let closes = rising(40);
        assert!(macd_values(&closes, 0, 26, 9).iter().all(Option::is_none));
        assert!(macd_values(&closes, 12, 0, 9).iter().all(Option::is_none));
        assert!(macd_values(&closes, 12, 26, 0).iter().all(Option::is_none));
    }

    #[test]
    fn macd_short_series_is_all_warmup() {
        let values = macd_values(&rising(20), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        assert_eq!(values.len(), 20);
        assert!(values.iter().all(Option::is_none));
    }

    #[test]
    fn macd_custom_parameters() {
        let values = macd_values(&rising(20), 5, 10, 3);
        let warmup = 10 - 1 + 3 - 1;
        assert!(values[warmup - 1].is_none());
        assert!(values[warmup].is_some());
    }
}
