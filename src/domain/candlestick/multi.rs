//! Detectors spanning three or more candles. The pattern completes on bar `i`.

use super::settings::{
    BODY_DOJI, BODY_LONG, BODY_SHORT, EQUAL, FAR, NEAR, SHADOW_VERY_SHORT, average,
    body_gap_down, body_gap_up, color,
};
use crate::domain::ohlcv::PriceBar;

const STAR_PENETRATION: f64 = 0.3;
const MAT_HOLD_PENETRATION: f64 = 0.5;

fn triple(bars: &[PriceBar], i: usize) -> Option<(&PriceBar, &PriceBar, &PriceBar)> {
    let first = i.checked_sub(2)?;
    Some((&bars[first], &bars[first + 1], &bars[i]))
}

/// The five candles ending at `i`, oldest first.
fn five(bars: &[PriceBar], i: usize) -> Option<&[PriceBar]> {
    let start = i.checked_sub(4)?;
    Some(&bars[start..=i])
}

/// CDL3WHITESOLDIERS
pub fn three_white_soldiers(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    for (k, bar) in [(i - 2, first), (i - 1, second), (i, third)] {
        if color(bar) != 1 || bar.upper_shadow() >= average(bars, SHADOW_VERY_SHORT, k)? {
            return None;
        }
    }
    (third.close > second.close
        && second.close > first.close
        && second.open > first.open
        && second.open <= first.close + average(bars, NEAR, i - 2)?
        && third.open > second.open
        && third.open <= second.close + average(bars, NEAR, i - 1)?
        && second.body() > first.body() - average(bars, FAR, i - 2)?
        && third.body() > second.body() - average(bars, FAR, i - 1)?
        && third.body() > average(bars, BODY_SHORT, i)?)
        .then_some(100)
}

/// CDL3BLACKCROWS: three declining black candles after a white one.
pub fn three_black_crows(bars: &[PriceBar], i: usize) -> Option<i32> {
    let prior = &bars[i.checked_sub(3)?];
    let (first, second, third) = triple(bars, i)?;
    for (k, bar) in [(i - 2, first), (i - 1, second), (i, third)] {
        if color(bar) != -1 || bar.lower_shadow() >= average(bars, SHADOW_VERY_SHORT, k)? {
            return None;
        }
    }
    (color(prior) == 1
        && second.open < first.open
        && second.open > first.close
        && third.open < second.open
        && third.open > second.close
        && prior.high > first.close
        && first.close > second.close
        && second.close > third.close)
        .then_some(-100)
}

/// CDLIDENTICAL3CROWS: three black candles each opening at the prior close.
pub fn identical_three_crows(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    for (k, bar) in [(i - 2, first), (i - 1, second), (i, third)] {
        if color(bar) != -1 || bar.lower_shadow() >= average(bars, SHADOW_VERY_SHORT, k)? {
            return None;
        }
    }
    let equal_first = average(bars, EQUAL, i - 2)?;
    let equal_second = average(bars, EQUAL, i - 1)?;
    (first.close > second.close
        && second.close > third.close
        && second.open <= first.close + equal_first
        && second.open >= first.close - equal_first
        && third.open <= second.close + equal_second
        && third.open >= second.close - equal_second)
        .then_some(-100)
}

/// CDL3INSIDE: harami confirmed by a third candle closing beyond the first open.
pub fn three_inside(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    let harami = first.body() > average(bars, BODY_LONG, i - 2)?
        && second.body() <= average(bars, BODY_SHORT, i - 1)?
        && second.body_top() < first.body_top()
        && second.body_bottom() > first.body_bottom();
    if !harami {
        return None;
    }
    let confirmed = (color(first) == 1 && color(third) == -1 && third.close < first.open)
        || (color(first) == -1 && color(third) == 1 && third.close > first.open);
    confirmed.then_some(-color(first) * 100)
}

/// CDL3OUTSIDE: engulfing confirmed by a third candle extending the move.
pub fn three_outside(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    let up = color(second) == 1
        && color(first) == -1
        && second.close > first.open
        && second.open < first.close
        && third.close > second.close;
    let down = color(second) == -1
        && color(first) == 1
        && second.open > first.close
        && second.close < first.open
        && third.close < second.close;
    (up || down).then_some(color(second) * 100)
}

/// CDL2CROWS
pub fn two_crows(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    (color(first) == 1
        && first.body() > average(bars, BODY_LONG, i - 2)?
        && color(second) == -1
        && body_gap_up(second, first)
        && color(third) == -1
        && third.open < second.open
        && third.open > second.close
        && third.close > first.open
        && third.close < first.close)
        .then_some(-100)
}

/// CDLUPSIDEGAP2CROWS
pub fn upside_gap_two_crows(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    (color(first) == 1
        && first.body() > average(bars, BODY_LONG, i - 2)?
        && color(second) == -1
        && second.body() <= average(bars, BODY_SHORT, i - 1)?
        && body_gap_up(second, first)
        && color(third) == -1
        && third.open > second.open
        && third.close < second.close
        && third.close > first.close)
        .then_some(-100)
}

/// Shared star geometry; `direction` is +1 for morning, -1 for evening.
fn star(bars: &[PriceBar], i: usize, middle_body: f64, direction: i32) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    let penetration = first.body() * STAR_PENETRATION;
    let (gapped, reversed) = if direction > 0 {
        (
            body_gap_down(second, first),
            third.close > first.close + penetration,
        )
    } else {
        (
            body_gap_up(second, first),
            third.close < first.close - penetration,
        )
    };
    (first.body() > average(bars, BODY_LONG, i - 2)?
        && color(first) == -direction
        && second.body() <= middle_body
        && gapped
        && third.body() > average(bars, BODY_SHORT, i)?
        && color(third) == direction
        && reversed)
        .then_some(direction * 100)
}

/// CDLMORNINGSTAR
pub fn morning_star(bars: &[PriceBar], i: usize) -> Option<i32> {
    let middle = average(bars, BODY_SHORT, i.checked_sub(1)?)?;
    star(bars, i, middle, 1)
}

/// CDLMORNINGDOJISTAR
pub fn morning_doji_star(bars: &[PriceBar], i: usize) -> Option<i32> {
    let middle = average(bars, BODY_DOJI, i.checked_sub(1)?)?;
    star(bars, i, middle, 1)
}

/// CDLEVENINGSTAR
pub fn evening_star(bars: &[PriceBar], i: usize) -> Option<i32> {
    let middle = average(bars, BODY_SHORT, i.checked_sub(1)?)?;
    star(bars, i, middle, -1)
}

/// CDLEVENINGDOJISTAR
pub fn evening_doji_star(bars: &[PriceBar], i: usize) -> Option<i32> {
    let middle = average(bars, BODY_DOJI, i.checked_sub(1)?)?;
    star(bars, i, middle, -1)
}

/// CDLTRISTAR: three dojis with the middle one gapping away.
pub fn tristar(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    let doji = average(bars, BODY_DOJI, i - 2)?;
    if first.body() > doji || second.body() > doji || third.body() > doji {
        return None;
    }
    if body_gap_up(second, first) && third.body_top() < second.body_top() {
        return Some(-100);
    }
    if body_gap_down(second, first) && third.body_bottom() > second.body_bottom() {
        return Some(100);
    }
    None
}

/// CDLTASUKIGAP
pub fn tasuki_gap(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    let similar = (second.body() - third.body()).abs() < average(bars, NEAR, i - 1)?;
    let upside = body_gap_up(second, first)
        && color(second) == 1
        && color(third) == -1
        && third.open < second.close
        && third.open > second.open
        && third.close < second.open
        && third.close > first.body_top();
    let downside = body_gap_down(second, first)
        && color(second) == -1
        && color(third) == 1
        && third.open < second.open
        && third.open > second.close
        && third.close > second.open
        && third.close < first.body_bottom();
    match (upside, downside) {
        (true, _) if similar => Some(100),
        (_, true) if similar => Some(-100),
        _ => None,
    }
}

/// CDLGAPSIDESIDEWHITE: two similar white candles side by side after a gap.
pub fn gap_side_side_white(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    let up = body_gap_up(second, first) && body_gap_up(third, first);
    let down = body_gap_down(second, first) && body_gap_down(third, first);
    let near = average(bars, NEAR, i - 1)?;
    let equal = average(bars, EQUAL, i - 1)?;
    ((up || down)
        && color(second) == 1
        && color(third) == 1
        && third.body() >= second.body() - near
        && third.body() <= second.body() + near
        && third.open >= second.open - equal
        && third.open <= second.open + equal)
        .then_some(if up { 100 } else { -100 })
}

/// CDLXSIDEGAP3METHODS: gap between two same-colour candles closed by the third.
pub fn x_side_gap_three_methods(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    let gapped = match color(first) {
        1 => body_gap_up(second, first),
        _ => body_gap_down(second, first),
    };
    (color(first) == color(second)
        && color(second) == -color(third)
        && third.open < second.body_top()
        && third.open > second.body_bottom()
        && third.close < first.body_top()
        && third.close > first.body_bottom()
        && gapped)
        .then_some(color(first) * 100)
}

/// CDLRISEFALL3METHODS: long candle, three small reactions inside its range,
/// then a long candle resuming the trend.
pub fn rise_fall_three_methods(bars: &[PriceBar], i: usize) -> Option<i32> {
    let start = i.checked_sub(4)?;
    let window = &bars[start..=i];
    let (first, last) = (&window[0], &window[4]);
    let trend = color(first);
    let trend_f = f64::from(trend);

    if first.body() <= average(bars, BODY_LONG, start)?
        || last.body() <= average(bars, BODY_LONG, i)?
        || color(last) != trend
    {
        return None;
    }
    for (offset, bar) in window[1..4].iter().enumerate() {
        if bar.body() >= average(bars, BODY_SHORT, start + 1 + offset)?
            || color(bar) != -trend
            || bar.body_bottom() >= first.high
            || bar.body_top() <= first.low
        {
            return None;
        }
    }
    (window[2].close * trend_f < window[1].close * trend_f
        && window[3].close * trend_f < window[2].close * trend_f
        && last.open * trend_f > window[3].close * trend_f
        && last.close * trend_f > first.close * trend_f)
        .then_some(trend * 100)
}

/// CDLUNIQUE3RIVER: long black candle, a black harami-like candle making a
/// new low, then a small white candle above that low.
pub fn unique_three_river(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    (first.body() > average(bars, BODY_LONG, i - 2)?
        && color(first) == -1
        && color(second) == -1
        && second.close > first.close
        && second.open <= first.open
        && second.low < first.low
        && third.body() < average(bars, BODY_SHORT, i)?
        && color(third) == 1
        && third.open > second.low)
        .then_some(100)
}

/// CDLSTALLEDPATTERN: two long white candles then a small one riding the
/// second's close.
pub fn stalled_pattern(bars: &[PriceBar], i: usize) -> Option<i32> {
    let (first, second, third) = triple(bars, i)?;
    (color(first) == 1
        && color(second) == 1
        && color(third) == 1
        && third.close > second.close
        && second.close > first.close
        && first.body() > average(bars, BODY_LONG, i - 2)?
        && second.body() > average(bars, BODY_LONG, i - 1)?
        && second.upper_shadow() < average(bars, SHADOW_VERY_SHORT, i - 1)?
        && second.open > first.open
        && second.open <= first.close + average(bars, NEAR, i - 2)?
        && third.body() < average(bars, BODY_SHORT, i)?
        && third.open >= second.close - third.body() - average(bars, NEAR, i - 1)?)
        .then_some(-100)
}

/// CDLCONCEALBABYSWALL: two black marubozu, a gapping black candle probing
/// upward, then a black candle engulfing its range.
pub fn conceal_baby_swallow(bars: &[PriceBar], i: usize) -> Option<i32> {
    let start = i.checked_sub(3)?;
    let window = &bars[start..=i];
    if window.iter().any(|bar| color(bar) != -1) {
        return None;
    }
    for (offset, bar) in window[..2].iter().enumerate() {
        let very_short = average(bars, SHADOW_VERY_SHORT, start + offset)?;
        if bar.lower_shadow() >= very_short || bar.upper_shadow() >= very_short {
            return None;
        }
    }
    let (second, third, fourth) = (&window[1], &window[2], &window[3]);
    (body_gap_down(third, second)
        && third.upper_shadow() > average(bars, SHADOW_VERY_SHORT, i - 1)?
        && third.high > second.close
        && fourth.high > third.high
        && fourth.low < third.low)
        .then_some(100)
}

/// CDLLADDERBOTTOM: three falling black candles, a black one with an upper
/// shadow, then a white candle closing above that shadow.
pub fn ladder_bottom(bars: &[PriceBar], i: usize) -> Option<i32> {
    let window = five(bars, i)?;
    let (fourth, fifth) = (&window[3], &window[4]);
    let falling = window[..3].iter().all(|bar| color(bar) == -1)
        && window[0].open > window[1].open
        && window[1].open > window[2].open
        && window[0].close > window[1].close
        && window[1].close > window[2].close;
    (falling
        && color(fourth) == -1
        && fourth.upper_shadow() > average(bars, SHADOW_VERY_SHORT, i - 1)?
        && color(fifth) == 1
        && fifth.open > fourth.open
        && fifth.close > fourth.high)
        .then_some(100)
}

/// CDLMATHOLD: long white candle, three small candles holding inside its
/// upper half after a gap, then a white candle to new highs.
pub fn mat_hold(bars: &[PriceBar], i: usize) -> Option<i32> {
    let window = five(bars, i)?;
    let start = i - 4;
    let (first, last) = (&window[0], &window[4]);
    if first.body() <= average(bars, BODY_LONG, start)? {
        return None;
    }
    for (offset, bar) in window[1..4].iter().enumerate() {
        if bar.body() >= average(bars, BODY_SHORT, start + 1 + offset)? {
            return None;
        }
    }
    let floor = first.close - first.body() * MAT_HOLD_PENETRATION;
    let (second, third, fourth) = (&window[1], &window[2], &window[3]);
    let reaction_high = second.high.max(third.high).max(fourth.high);
    (color(first) == 1
        && color(second) == -1
        && color(last) == 1
        && body_gap_up(second, first)
        && third.body_bottom() < first.close
        && fourth.body_bottom() < first.close
        && third.body_bottom() > floor
        && fourth.body_bottom() > floor
        && third.body_top() < second.open
        && fourth.body_top() < third.body_top()
        && last.open > fourth.close
        && last.close > reaction_high)
        .then_some(100)
}

/// CDLBREAKAWAY: a long candle, a gap in its direction, two more candles
/// extending the move, then a reversal candle closing inside the gap.
pub fn breakaway(bars: &[PriceBar], i: usize) -> Option<i32> {
    let window = five(bars, i)?;
    let (first, second, third, fourth, last) =
        (&window[0], &window[1], &window[2], &window[3], &window[4]);
    if first.body() <= average(bars, BODY_LONG, i - 4)?
        || color(first) != color(second)
        || color(second) != color(fourth)
        || color(fourth) != -color(last)
    {
        return None;
    }
    let down = color(first) == -1
        && body_gap_down(second, first)
        && third.high < second.high
        && third.low < second.low
        && fourth.high < third.high
        && fourth.low < third.low
        && last.close > second.open
        && last.close < first.close;
    let up = color(first) == 1
        && body_gap_up(second, first)
        && third.high > second.high
        && third.low > second.low
        && fourth.high > third.high
        && fourth.low > third.low
        && last.close < second.open
        && last.close > first.close;
    (down || up).then_some(color(last) * 100)
}

/// CDLHIKKAKE over the whole series.
///
/// An inside bar followed by a break of its range marks the pattern (+/-100);
/// a close beyond the inside bar's opposite extreme within three bars
/// confirms it (+/-200).
pub fn hikkake(bars: &[PriceBar]) -> Vec<i32> {
    let mut out = vec![0; bars.len()];
    let mut pending: Option<(usize, i32)> = None;

    for i in 2..bars.len() {
        let (mother, inside, bar) = (&bars[i - 2], &bars[i - 1], &bars[i]);
        let is_inside = inside.high < mother.high && inside.low > mother.low;
        let broke_down = bar.high < inside.high && bar.low < inside.low;
        let broke_up = bar.high > inside.high && bar.low > inside.low;

        if is_inside && (broke_down || broke_up) {
            let signal = if broke_down { 100 } else { -100 };
            out[i] = signal;
            pending = Some((i, signal));
            continue;
        }

        if let Some((at, signal)) = pending {
            if i > at + 3 {
                pending = None;
                continue;
            }
            let setup = &bars[at - 1];
            let confirmed = (signal > 0 && bar.close > setup.high)
                || (signal < 0 && bar.close < setup.low);
            if confirmed {
                out[i] = signal * 2;
                pending = None;
            }
        }
    }
    out
}

/// CDLHIKKAKEMOD over the whole series.
///
/// Two nested inside bars, the first closing near its extreme, followed by a
/// break of the inner bar's range. Confirmation works as for [`hikkake`].
pub fn hikkake_mod(bars: &[PriceBar]) -> Vec<i32> {
    let mut out = vec![0; bars.len()];
    let mut pending: Option<(usize, i32)> = None;

    for i in 3..bars.len() {
        let (outer, first, second, bar) = (&bars[i - 3], &bars[i - 2], &bars[i - 1], &bars[i]);
        let nested = first.high < outer.high
            && first.low > outer.low
            && second.high < first.high
            && second.low > first.low;
        let signal = match average(bars, NEAR, i - 2) {
            Some(near) if nested => {
                if bar.high < second.high && bar.low < second.low && first.close <= first.low + near {
                    Some(100)
                } else if bar.high > second.high
                    && bar.low > second.low
                    && first.close >= first.high - near
                {
                    Some(-100)
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some(signal) = signal {
            out[i] = signal;
            pending = Some((i, signal));
            continue;
        }

        if let Some((at, signal)) = pending {
            if i > at + 3 {
                pending = None;
                continue;
            }
            let setup = &bars[at - 1];
            let confirmed = (signal > 0 && bar.close > setup.high)
                || (signal < 0 && bar.close < setup.low);
            if confirmed {
                out[i] = signal * 2;
                pending = None;
            }
        }
    }
    out
}
