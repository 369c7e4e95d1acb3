//! MACD signal-line crossover predicates.

use super::library::PredicateContext;
use super::params::StepParams;
use super::DEFAULT_DURATION;
use crate::domain::error::PredicateError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{IndicatorValue, calculate_macd};
use crate::domain::ohlcv::PriceSeries;

const PARAMS: [&str; 4] = ["fast", "slow", "signal", "duration"];

fn crossover(series: &PriceSeries, params: &StepParams, bullish: bool) -> Result<bool, PredicateError> {
    params.ensure_only(&PARAMS)?;
    let fast = params.positive_or("fast", DEFAULT_FAST)?;
    let slow = params.positive_or("slow", DEFAULT_SLOW)?;
    let signal = params.positive_or("signal", DEFAULT_SIGNAL)?;
    let duration = params.usize_or("duration", DEFAULT_DURATION)?;
    if series.len() < slow {
        return Ok(false);
    }

    let points: Vec<Option<(f64, f64)>> = calculate_macd(&series.bars, fast, slow, signal)
        .values
        .into_iter()
        .map(|p| match p.value {
            IndicatorValue::Macd { line, signal, .. } if p.valid => Some((line, signal)),
            _ => None,
        })
        .collect();

    let start = points.len() - series.window(duration);
    Ok((start.max(1)..points.len()).any(|i| match (points[i - 1], points[i]) {
        (Some((prev_line, prev_signal)), Some((line, signal))) => {
            if bullish {
                prev_line < prev_signal && line > signal
            } else {
                prev_line > prev_signal && line < signal
            }
        }
        _ => false,
    }))
}

/// MACD line crossed above its signal line within the last `duration` bars.
pub fn is_bullish_macd_crossover(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    crossover(series, params, true)
}

/// MACD line crossed below its signal line within the last `duration` bars.
pub fn is_bearish_macd_crossover(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    crossover(series, params, false)
}
