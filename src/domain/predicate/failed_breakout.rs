//! Failed breakouts of the previous session's range.
//!
//! Meant for intraday series. The current session is the calendar date of the
//! newest bar; the previous session is the latest earlier date present in the
//! series. A breakout fails when, within `max_accept_bars` bars of the first
//! break, a close lands back inside the range and every later close stays there.

use super::library::PredicateContext;
use super::params::StepParams;
use crate::domain::error::PredicateError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};

pub const DEFAULT_MAX_ACCEPT_BARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Break below the previous low, then acceptance back above it.
    Bear,
    /// Break above the previous high, then acceptance back below it.
    Bull,
}

/// Bars of the newest session and of the session before it.
fn sessions(bars: &[PriceBar]) -> Option<(&[PriceBar], &[PriceBar])> {
    let current_day = bars.last()?.date();
    let current_start = bars.iter().position(|b| b.date() == current_day)?;
    let previous_day = bars[..current_start].last()?.date();
    let previous_start = bars[..current_start]
        .iter()
        .position(|b| b.date() == previous_day)?;
    Some((
        &bars[previous_start..current_start],
        &bars[current_start..],
    ))
}

fn failed_breakout(bars: &[PriceBar], side: Side, max_accept_bars: usize) -> bool {
    let Some((previous, current)) = sessions(bars) else {
        return false;
    };

    let level = match side {
        Side::Bear => previous.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
        Side::Bull => previous.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
    };
    let breaks = |bar: &PriceBar| match side {
        Side::Bear => bar.low < level,
        Side::Bull => bar.high > level,
    };
    let back_inside = |close: f64| match side {
        Side::Bear => close > level,
        Side::Bull => close < level,
    };
    let stays_inside = |close: f64| match side {
        Side::Bear => close >= level,
        Side::Bull => close <= level,
    };

    let Some(first_break) = current.iter().position(breaks) else {
        return false;
    };
    let search_end = first_break
        .saturating_add(max_accept_bars)
        .saturating_add(1)
        .min(current.len());
    match (first_break..search_end).find(|&j| back_inside(current[j].close)) {
        Some(accepted) => current[accepted + 1..]
            .iter()
            .all(|bar| stays_inside(bar.close)),
        None => false,
    }
}

fn max_accept_bars(params: &StepParams) -> Result<usize, PredicateError> {
    params.ensure_only(&["max_accept_bars"])?;
    params.usize_or("max_accept_bars", DEFAULT_MAX_ACCEPT_BARS)
}

/// Failed bear breakout: price undercut the previous low and was bought back.
pub fn is_failed_brbo(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    let max_accept = max_accept_bars(params)?;
    Ok(failed_breakout(&series.bars, Side::Bear, max_accept))
}

/// Failed bull breakout: price exceeded the previous high and was sold back.
pub fn is_failed_blbo(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    let max_accept = max_accept_bars(params)?;
    Ok(failed_breakout(&series.bars, Side::Bull, max_accept))
}

/// Either side failed.
pub fn is_failed_bo(
    series: &PriceSeries,
    params: &StepParams,
    _ctx: &PredicateContext<'_>,
) -> Result<bool, PredicateError> {
    let max_accept = max_accept_bars(params)?;
    Ok(failed_breakout(&series.bars, Side::Bear, max_accept)
        || failed_breakout(&series.bars, Side::Bull, max_accept))
}
