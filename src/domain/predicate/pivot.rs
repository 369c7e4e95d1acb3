//! Last close near a floor-trader pivot level.
//!
//! Pivots always come from the symbol's daily series, whatever interval the
//! step is evaluated at: the levels of the newest daily bar are computed from
//! the daily bar before it.

use super::library::PredicateContext;
use super::params::StepParams;
use crate::domain::error::PredicateError;
use crate::domain::indicator::calculate_pivots;
use crate::domain::indicator::pivot::{LEVEL_NAMES, named_levels};
use crate::domain::ohlcv::PriceSeries;

pub const PIVOT_INTERVAL: &str = "1d";
pub const DEFAULT_TOLERANCE: f64 = 0.01;

fn parse_levels(raw: &str) -> Result<Vec<&'static str>, PredicateError> {
    let mut levels = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let level = LEVEL_NAMES
            .iter()
            .find(|name| name.eq_ignore_ascii_case(part))
            .ok_or_else(|| PredicateError::InvalidParameter {
                name: "levels".to_string(),
                reason: format!("unknown pivot level '{}'", part),
            })?;
        levels.push(*level);
    }
    if levels.is_empty() {
        levels.extend(LEVEL_NAMES);
    }
    Ok(levels)
}

pub fn is_last_close_near_pivotpoints(
    series: &PriceSeries,
    params: &StepParams,
    ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    params.ensure_only(&["levels", "tolerance"])?;
    let levels = parse_levels(params.str_or("levels", "")?)?;
    let tolerance = params.f64_or("tolerance", DEFAULT_TOLERANCE)?;

    let Some(last) = series.last() else {
        return Ok(false);
    };
    let Some(daily) = ctx.data.load(ctx.symbol, PIVOT_INTERVAL)? else {
        return Ok(false);
    };
    let pivots = calculate_pivots(&daily.bars);
    let Some(latest) = pivots.values.last().filter(|p| p.valid) else {
        return Ok(false);
    };
    let Some(named) = named_levels(&latest.value) else {
        return Ok(false);
    };

    let close = last.close;
    Ok(named
        .iter()
        .filter(|(name, _)| levels.contains(name))
        .any(|(_, level)| ((close - level) / close).abs() <= tolerance))
}
