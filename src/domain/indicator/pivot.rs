//! Classic floor-trader pivot points.
//!
//! Each point is computed from the previous bar's high, low and close:
//! PP = (H + L + C) / 3
//! R1 = 2PP - L, S1 = 2PP - H
//! R2 = PP + (H - L), S2 = PP - (H - L)
//! R3 = H + 2(PP - L), S3 = L - 2(H - PP)
//!
//! Warmup: the first bar has no previous bar and is invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub const LEVEL_NAMES: [&str; 7] = ["PP", "R1", "S1", "R2", "S2", "R3", "S3"];

pub fn calculate_pivots(bars: &[PriceBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = match i.checked_sub(1).map(|p| &bars[p]) {
            Some(prev) => pivot_from(prev),
            None => IndicatorValue::Pivot {
                pivot: 0.0,
                r1: 0.0,
                r2: 0.0,
                r3: 0.0,
                s1: 0.0,
                s2: 0.0,
                s3: 0.0,
            },
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: i > 0,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Pivot,
        values,
    }
}

fn pivot_from(prev: &PriceBar) -> IndicatorValue {
    let (high, low) = (prev.high, prev.low);
    let pivot = prev.typical_price();
    IndicatorValue::Pivot {
        pivot,
        r1: 2.0 * pivot - low,
        s1: 2.0 * pivot - high,
        r2: pivot + (high - low),
        s2: pivot - (high - low),
        r3: high + 2.0 * (pivot - low),
        s3: low - 2.0 * (high - pivot),
    }
}

/// Named levels of a pivot value, in `LEVEL_NAMES` order.
pub fn named_levels(value: &IndicatorValue) -> Option<[(&'static str, f64); 7]> {
    match *value {
        IndicatorValue::Pivot {
            pivot,
            r1,
            r2,
            r3,
            s1,
            s2,
            s3,
        } => Some([
            ("PP", pivot),
            ("R1", r1),
            ("S1", s1),
            ("R2", r2),
            ("S2", s2),
            ("R3", r3),
            ("S3", s3),
        ]),
        _ => None,
    }
}
