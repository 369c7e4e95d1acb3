//! Two-candle detectors. The pattern completes on bar `i`; bar `i - 1` is the setup.

use super::settings::{
    BODY_DOJI, BODY_LONG, BODY_SHORT, EQUAL, NEAR, SHADOW_LONG, SHADOW_VERY_SHORT, average,
    body_gap_down, body_gap_up, color,
};
use crate::domain::ohlcv::PriceBar;

const PIERCE: f64 = 0.5;

fn pair(bars: &[PriceBar], i: usize) -> Option<(&PriceBar, &PriceBar)> {
    let p = i.checked_sub(1)?;
    Some((&bars[p], &bars[i]))
}

/// Small body at the top of the range with a long lower shadow.
fn hammer_shape(bars: &[PriceBar], i: usize) -> Option<bool> {
    let bar = &bars[i];
    Some(
        bar.body() < average(bars, BODY_SHORT, i)?
            && bar.lower_shadow() > average(bars, SHADOW_LONG, i)?
            && bar.upper_shadow() < average(bars, SHADOW_VERY_SHORT, i)?,
    )
}

/// Small body at the bottom of the range with a long upper shadow.
fn inverted_shape(bars: &[PriceBar], i: usize) -> Option<bool> {
    let bar = &bars[i];
    Some(
        bar.body() < average(bars, BODY_SHORT, i)?
            && bar.upper_shadow() > average(bars, SHADOW_LONG, i)?
            && bar.lower_shadow() < average(bars, SHADOW_VERY_SHORT, i)?,
    )
}

/// CDLHAMMER: hammer whose body sits near or below the previous low.
pub fn hammer(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    let near = average(bars, NEAR, i - 1)?;
    (hammer_shape(bars, i)? && bar.body_bottom() <= prev.low + near).then_some(100)
}

/// CDLHANGINGMAN: hammer shape printed near or above the previous high.
pub fn hanging_man(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    let near = average(bars, NEAR, i - 1)?;
    (hammer_shape(bars, i)? && bar.body_bottom() >= prev.high - near).then_some(-100)
}

/// CDLINVERTEDHAMMER: inverted hammer gapping down from the previous body.
pub fn inverted_hammer(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (inverted_shape(bars, i)? && body_gap_down(bar, prev)).then_some(100)
}

/// CDLSHOOTINGSTAR: inverted hammer gapping up from the previous body.
pub fn shooting_star(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (inverted_shape(bars, i)? && body_gap_up(bar, prev)).then_some(-100)
}

/// CDLENGULFING
pub fn engulfing(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    if color(bar) == 1 && color(prev) == -1 && bar.close > prev.open && bar.open < prev.close {
        return Some(100);
    }
    if color(bar) == -1 && color(prev) == 1 && bar.open > prev.close && bar.close < prev.open {
        return Some(-100);
    }
    None
}

fn harami_with(bars: &[PriceBar], i: usize, second_body: f64) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (prev.body() > average(bars, BODY_LONG, i - 1)?
        && bar.body() <= second_body
        && bar.body_top() < prev.body_top()
        && bar.body_bottom() > prev.body_bottom())
        .then_some(-color(prev) * 100)
}

/// CDLHARAMI
pub fn harami(bars: &[PriceBar], i: usize) -> Option<i32> {
    harami_with(bars, i, average(bars, BODY_SHORT, i)?)
}

/// CDLHARAMICROSS: harami whose second candle is a doji.
pub fn harami_cross(bars: &[PriceBar], i: usize) -> Option<i32> {
    harami_with(bars, i, average(bars, BODY_DOJI, i)?)
}

/// CDLHOMINGPIGEON: black harami in a downtrend.
pub fn homing_pigeon(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (color(prev) == -1
        && color(bar) == -1
        && prev.body() > average(bars, BODY_LONG, i - 1)?
        && bar.body() <= average(bars, BODY_SHORT, i)?
        && bar.open < prev.open
        && bar.close > prev.close)
        .then_some(100)
}

/// CDLMATCHINGLOW: two black candles closing at the same level.
pub fn matching_low(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    let equal = average(bars, EQUAL, i - 1)?;
    (color(prev) == -1
        && color(bar) == -1
        && bar.close <= prev.close + equal
        && bar.close >= prev.close - equal)
        .then_some(100)
}

/// CDLCOUNTERATTACK: opposite long candles closing at the same level.
pub fn counterattack(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    let equal = average(bars, EQUAL, i - 1)?;
    (color(prev) == -color(bar)
        && prev.body() > average(bars, BODY_LONG, i - 1)?
        && bar.body() > average(bars, BODY_LONG, i)?
        && bar.close <= prev.close + equal
        && bar.close >= prev.close - equal)
        .then_some(color(bar) * 100)
}

/// CDLDARKCLOUDCOVER
pub fn dark_cloud_cover(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (color(prev) == 1
        && prev.body() > average(bars, BODY_LONG, i - 1)?
        && color(bar) == -1
        && bar.open > prev.high
        && bar.close > prev.open
        && bar.close < prev.close - prev.body() * PIERCE)
        .then_some(-100)
}

/// CDLPIERCING
pub fn piercing(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (color(prev) == -1
        && prev.body() > average(bars, BODY_LONG, i - 1)?
        && color(bar) == 1
        && bar.body() > average(bars, BODY_LONG, i)?
        && bar.open < prev.low
        && bar.close < prev.open
        && bar.close > prev.close + prev.body() * PIERCE)
        .then_some(100)
}

/// Long black candle followed by a white one opening below its low.
fn neck_setup(bars: &[PriceBar], i: usize) -> Option<bool> {
    let (prev, bar) = pair(bars, i)?;
    Some(
        color(prev) == -1
            && prev.body() > average(bars, BODY_LONG, i - 1)?
            && color(bar) == 1
            && bar.open < prev.low,
    )
}

/// CDLINNECK: white candle closing slightly into the black body.
pub fn in_neck(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (neck_setup(bars, i)?
        && bar.close <= prev.close + average(bars, NEAR, i - 1)?
        && bar.close >= prev.close)
        .then_some(-100)
}

/// CDLONNECK: white candle closing at the previous low.
pub fn on_neck(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    let equal = average(bars, EQUAL, i - 1)?;
    (neck_setup(bars, i)? && bar.close <= prev.low + equal && bar.close >= prev.low - equal)
        .then_some(-100)
}

/// CDLTHRUSTING: white candle closing into, but below the midpoint of, the black body.
pub fn thrusting(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    (neck_setup(bars, i)?
        && bar.close > prev.close + average(bars, EQUAL, i - 1)?
        && bar.close <= prev.close + prev.body() * PIERCE)
        .then_some(-100)
}

/// CDLSEPARATINGLINES: opposite colours opening at the same price.
pub fn separating_lines(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (prev, bar) = pair(bars, i)?;
    let equal = average(bars, EQUAL, i - 1)?;
    let very_short = average(bars, SHADOW_VERY_SHORT, i)?;
    let belt_hold = match color(bar) {
        1 => bar.lower_shadow() < very_short,
        _ => bar.upper_shadow() < very_short,
    };
    (color(prev) == -color(bar)
        && bar.open <= prev.open + equal
        && bar.open >= prev.open - equal
        && bar.body() > average(bars, BODY_LONG, i)?
        && belt_hold)
        .then_some(color(bar) * 100)
}
