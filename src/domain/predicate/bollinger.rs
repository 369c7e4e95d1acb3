//! Bollinger band proximity predicates.

use super::library::PredicateContext;
use super::params::StepParams;
use super::DEFAULT_DURATION;
use crate::domain::error::PredicateError;
use crate::domain::indicator::bollinger::{DEFAULT_NBDEV, DEFAULT_PERIOD};
use crate::domain::indicator::{IndicatorValue, calculate_bollinger};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_TOLERANCE: f64 = 0.01;

const PARAMS: [&str; 4] = ["period", "nbdev", "duration", "tolerance"];

/// `band_distance(close, upper, lower)` is a fraction of close; any recent
/// bar at or under `tolerance` counts.
fn near_band(
    series: &PriceSeries,
    params: &StepParams,
    band_distance: impl Fn(f64, f64, f64) -> f64,
) -> Result<bool, PredicateError> {
    params.ensure_only(&PARAMS)?;
    let period = params.positive_or("period", DEFAULT_PERIOD)?;
    let nbdev = params.f64_or("nbdev", DEFAULT_NBDEV)?;
    let duration = params.usize_or("duration", DEFAULT_DURATION)?;
    let tolerance = params.f64_or("tolerance", DEFAULT_TOLERANCE)?;
    if series.len() < period {
        return Ok(false);
    }

    let bands = calculate_bollinger(&series.bars, period, nbdev);
    let start = bands.values.len() - series.window(duration);
    Ok(bands.values[start..]
        .iter()
        .zip(&series.bars[start..])
        .any(|(point, bar)| match point.value {
            IndicatorValue::Bollinger { upper, lower, .. } if point.valid => {
                band_distance(bar.close, upper, lower) <= tolerance
            }
            _ => false,
        }))
}

/// Some recent close sits within `tolerance` (fraction of close) above the lower band.
pub fn is_near_lower_bb(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    near_band(series, params, |close, _, lower| (close - lower) / close)
}

/// Some recent close sits within `tolerance` (fraction of close) below the upper band.
pub fn is_near_upper_bb(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    near_band(series, params, |close, upper, _| (upper - close) / close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::test_support::{series_from_closes, with_context};

    fn sideways_then_drop() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        closes.push(96.0);
        closes
    }

    #[test]
    fn drop_touches_lower_band() {
        let series = series_from_closes(&sideways_then_drop());
        let last_bar = StepParams::new().with("duration", 1_i64);
        with_context(|ctx| {
            assert!(is_near_lower_bb(&series, &StepParams::new(), ctx).unwrap());
            assert!(is_near_lower_bb(&series, &last_bar, ctx).unwrap());
            assert!(!is_near_upper_bb(&series, &last_bar, ctx).unwrap());
        });
    }

    #[test]
    fn spike_touches_upper_band() {
        let closes: Vec<f64> = sideways_then_drop()
            .iter()
            .map(|c| 201.0 - c)
            .collect();
        let series = series_from_closes(&closes);
        with_context(|ctx| {
            assert!(is_near_upper_bb(&series, &StepParams::new(), ctx).unwrap());
        });
    }

    #[test]
    fn tight_tolerance_misses() {
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 110.0 })
            .collect();
        let series = series_from_closes(&closes);
        let params = StepParams::new().with("tolerance", 0.001);
        with_context(|ctx| {
            assert!(!is_near_lower_bb(&series, &params, ctx).unwrap());
            assert!(!is_near_upper_bb(&series, &params, ctx).unwrap());
        });
    }

    #[test]
    fn short_series_is_false() {
        let series = series_from_closes(&[100.0; 5]);
        with_context(|ctx| {
            assert!(!is_near_lower_bb(&series, &StepParams::new(), ctx).unwrap());
        });
    }
}
