//! Single-candle detectors: dojis, spinning tops, lines and marubozu.
//!
//! Every detector returns `Some(signal)` when the candle at `i` matches and
//! `None` otherwise (including while the trailing averages are warming up).

use super::settings::{
    BODY_DOJI, BODY_LONG, BODY_SHORT, NEAR, SHADOW_LONG, SHADOW_SHORT, SHADOW_VERY_LONG,
    SHADOW_VERY_SHORT, average, color,
};
use crate::domain::ohlcv::PriceBar;

/// CDLDOJI
pub fn doji(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    (bar.body() <= average(bars, BODY_DOJI, i)?).then_some(100)
}

/// CDLDRAGONFLYDOJI: doji with no upper shadow and a visible lower one.
pub fn dragonfly_doji(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let very_short = average(bars, SHADOW_VERY_SHORT, i)?;
    (bar.body() <= average(bars, BODY_DOJI, i)?
        && bar.upper_shadow() < very_short
        && bar.lower_shadow() > very_short)
        .then_some(100)
}

/// CDLGRAVESTONEDOJI: doji with no lower shadow and a visible upper one.
pub fn gravestone_doji(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let very_short = average(bars, SHADOW_VERY_SHORT, i)?;
    (bar.body() <= average(bars, BODY_DOJI, i)?
        && bar.lower_shadow() < very_short
        && bar.upper_shadow() > very_short)
        .then_some(100)
}

/// CDLLONGLEGGEDDOJI
pub fn long_legged_doji(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let long = average(bars, SHADOW_LONG, i)?;
    (bar.body() <= average(bars, BODY_DOJI, i)?
        && (bar.lower_shadow() > long || bar.upper_shadow() > long))
        .then_some(100)
}

/// CDLRICKSHAWMAN: long-legged doji with the body near the middle of the range.
pub fn rickshaw_man(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let long = average(bars, SHADOW_LONG, i)?;
    let near = average(bars, NEAR, i)?;
    let mid = bar.low + bar.range() / 2.0;
    (bar.body() <= average(bars, BODY_DOJI, i)?
        && bar.lower_shadow() > long
        && bar.upper_shadow() > long
        && bar.body_bottom() <= mid + near
        && bar.body_top() >= mid - near)
        .then_some(100)
}

/// CDLTAKURI: dragonfly doji with a very long lower shadow.
pub fn takuri(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    (bar.body() <= average(bars, BODY_DOJI, i)?
        && bar.upper_shadow() < average(bars, SHADOW_VERY_SHORT, i)?
        && bar.lower_shadow() > average(bars, SHADOW_VERY_LONG, i)?)
        .then_some(100)
}

/// CDLSPINNINGTOP
pub fn spinning_top(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    (bar.body() < average(bars, BODY_SHORT, i)?
        && bar.upper_shadow() > bar.body()
        && bar.lower_shadow() > bar.body())
        .then_some(color(bar) * 100)
}

/// CDLSHORTLINE
pub fn short_line(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let short = average(bars, SHADOW_SHORT, i)?;
    (bar.body() < average(bars, BODY_SHORT, i)?
        && bar.upper_shadow() < short
        && bar.lower_shadow() < short)
        .then_some(color(bar) * 100)
}

/// CDLLONGLINE
pub fn long_line(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let short = average(bars, SHADOW_SHORT, i)?;
    (bar.body() > average(bars, BODY_LONG, i)?
        && bar.upper_shadow() < short
        && bar.lower_shadow() < short)
        .then_some(color(bar) * 100)
}

/// CDLHIGHWAVE: short body with two very long shadows.
pub fn high_wave(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let very_long = average(bars, SHADOW_VERY_LONG, i)?;
    (bar.body() < average(bars, BODY_SHORT, i)?
        && bar.upper_shadow() > very_long
        && bar.lower_shadow() > very_long)
        .then_some(color(bar) * 100)
}

/// CDLMARUBOZU
pub fn marubozu(bars: &[PriceBar], i: usize) -> Option<i32> {
    let bar = &bars[i];
    let very_short = average(bars, SHADOW_VERY_SHORT, i)?;
    (bar.body() > average(bars, BODY_LONG, i)?
        && bar.upper_shadow() < very_short
        && bar.lower_shadow() < very_short)
        .then_some(color(bar) * 100)
}
