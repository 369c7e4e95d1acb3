//! RSI threshold and divergence predicates.

use super::library::PredicateContext;
use super::params::StepParams;
use super::DEFAULT_DURATION;
use crate::domain::error::PredicateError;
use crate::domain::indicator::calculate_rsi;
use crate::domain::indicator::rsi::DEFAULT_PERIOD;
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_OVERSOLD: f64 = 30.0;

/// RSI values of the last `duration` bars, or `None` when the series is
/// shorter than the RSI period.
fn recent_rsi(
    series: &PriceSeries,
    params: &StepParams,
) -> Result<Option<(Vec<Option<f64>>, usize)>, PredicateError> {
    let period = params.positive_or("period", DEFAULT_PERIOD)?;
    let duration = params.usize_or("duration", DEFAULT_DURATION)?;
    if series.len() < period {
        return Ok(None);
    }
    let rsi = calculate_rsi(&series.bars, period).simple_values();
    Ok(Some((rsi, series.window(duration))))
}

pub fn is_rsi_overbought(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    params.ensure_only(&["period", "overbought", "duration"])?;
    let overbought = params.f64_or("overbought", DEFAULT_OVERBOUGHT)?;
    let Some((rsi, window)) = recent_rsi(series, params)? else {
        return Ok(false);
    };
    Ok(rsi[rsi.len() - window..]
        .iter()
        .flatten()
        .any(|v| *v >= overbought))
}

pub fn is_rsi_oversold(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    params.ensure_only(&["period", "oversold", "duration"])?;
    let oversold = params.f64_or("oversold", DEFAULT_OVERSOLD)?;
    let Some((rsi, window)) = recent_rsi(series, params)? else {
        return Ok(false);
    };
    Ok(rsi[rsi.len() - window..]
        .iter()
        .flatten()
        .any(|v| *v <= oversold))
}

/// Indices of strict local extrema; endpoints never qualify.
fn local_extrema(values: &[f64], is_extreme: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    (1..values.len().saturating_sub(1))
        .filter(|&i| {
            is_extreme(values[i], values[i - 1]) && is_extreme(values[i], values[i + 1])
        })
        .collect()
}

/// Scans consecutive pivot pairs for a price/RSI disagreement.
fn divergence(
    series: &PriceSeries,
    params: &StepParams,
    bullish: bool,
) -> Result<bool, PredicateError> {
    params.ensure_only(&["period", "duration"])?;
    let Some((rsi, window)) = recent_rsi(series, params)? else {
        return Ok(false);
    };
    let closes = series.closes();
    let prices = &closes[closes.len() - window..];
    let rsi = &rsi[rsi.len() - window..];

    let pivots = if bullish {
        local_extrema(prices, |v, n| v < n)
    } else {
        local_extrema(prices, |v, n| v > n)
    };

    Ok(pivots.windows(2).any(|pair| {
        let (i1, i2) = (pair[0], pair[1]);
        let (Some(r1), Some(r2)) = (rsi[i1], rsi[i2]) else {
            return false;
        };
        if bullish {
            prices[i2] < prices[i1] && r2 > r1
        } else {
            prices[i2] > prices[i1] && r2 < r1
        }
    }))
}

/// Lower price low paired with a higher RSI low.
pub fn is_rsi_bullish_divergence(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    divergence(series, params, true)
}

/// Higher price high paired with a lower RSI high.
pub fn is_rsi_bearish_divergence(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    divergence(series, params, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::test_support::{series_from_closes, with_context};

    #[test]
    fn overbought_on_steady_rise() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        with_context(|ctx| {
            assert!(is_rsi_overbought(&series, &StepParams::new(), ctx).unwrap());
            assert!(!is_rsi_oversold(&series, &StepParams::new(), ctx).unwrap());
        });
    }

    #[test]
    fn oversold_on_steady_fall() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        let series = series_from_closes(&closes);
        with_context(|ctx| {
            assert!(is_rsi_oversold(&series, &StepParams::new(), ctx).unwrap());
            assert!(!is_rsi_overbought(&series, &StepParams::new(), ctx).unwrap());
        });
    }

    #[test]
    fn flat_series_reads_as_oversold() {
        let series = series_from_closes(&[100.0; 30]);
        with_context(|ctx| {
            assert!(!is_rsi_overbought(&series, &StepParams::new(), ctx).unwrap());
            assert!(is_rsi_oversold(&series, &StepParams::new(), ctx).unwrap());
        });
    }

    #[test]
    fn short_series_is_false_not_error() {
        let series = series_from_closes(&[100.0, 101.0, 102.0]);
        let params = StepParams::new().with("duration", 500_i64);
        with_context(|ctx| {
            assert!(!is_rsi_overbought(&series, &params, ctx).unwrap());
            assert!(!is_rsi_bullish_divergence(&series, &params, ctx).unwrap());
        });
    }

    #[test]
    fn duration_larger_than_series_is_clamped() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let params = StepParams::new().with("duration", 1000_i64);
        with_context(|ctx| {
            assert!(is_rsi_overbought(&series, &params, ctx).unwrap());
        });
    }

    #[test]
    fn unexpected_parameter_is_rejected() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let params = StepParams::new().with("oversold", 20_i64);
        with_context(|ctx| {
            assert_eq!(
                is_rsi_overbought(&series, &params, ctx).unwrap_err(),
                PredicateError::UnexpectedParameter {
                    name: "oversold".into()
                }
            );
        });
    }

    #[test]
    fn local_extrema_are_strict() {
        let values = [3.0, 1.0, 2.0, 2.0, 0.5, 4.0];
        assert_eq!(local_extrema(&values, |v, n| v < n), vec![1, 4]);
        assert!(local_extrema(&values, |v, n| v > n).is_empty());
    }

    #[test]
    fn bullish_divergence_lower_low_with_stronger_rsi() {
        // Sharp drop into the first low, then a shallow drift to a slightly
        // lower second low: RSI recovers while price makes a new low.
        let mut closes: Vec<f64> = (0..20).map(|i| 120.0 - i as f64 * 0.2).collect();
        closes.extend([
            110.0, 100.0, 104.0, 103.5, 103.0, 102.5, 102.0, 101.5, 101.0, 100.5, 99.8, 101.0,
        ]);
        let series = series_from_closes(&closes);
        with_context(|ctx| {
            assert!(is_rsi_bullish_divergence(&series, &StepParams::new(), ctx).unwrap());
            assert!(!is_rsi_bearish_divergence(&series, &StepParams::new(), ctx).unwrap());
        });
    }
}
