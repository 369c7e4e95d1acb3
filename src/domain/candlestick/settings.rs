//! Candle settings shared by the pattern detectors (TA-Lib defaults).
//!
//! Each setting compares one candle measure against a trailing average of a
//! reference measure over the bars *before* the candle being classified.
//! A setting with `avg_period == 0` uses the candle's own reference measure.

use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeType {
    RealBody,
    HighLow,
    Shadows,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleSetting {
    pub range_type: RangeType,
    pub avg_period: usize,
    pub factor: f64,
}

pub const BODY_LONG: CandleSetting = CandleSetting {
    range_type: RangeType::RealBody,
    avg_period: 10,
    factor: 1.0,
};

pub const BODY_SHORT: CandleSetting = CandleSetting {
    range_type: RangeType::RealBody,
    avg_period: 10,
    factor: 1.0,
};

pub const BODY_DOJI: CandleSetting = CandleSetting {
    range_type: RangeType::HighLow,
    avg_period: 10,
    factor: 0.1,
};

pub const SHADOW_LONG: CandleSetting = CandleSetting {
    range_type: RangeType::RealBody,
    avg_period: 0,
    factor: 1.0,
};

pub const SHADOW_VERY_LONG: CandleSetting = CandleSetting {
    range_type: RangeType::RealBody,
    avg_period: 0,
    factor: 2.0,
};

pub const SHADOW_SHORT: CandleSetting = CandleSetting {
    range_type: RangeType::Shadows,
    avg_period: 10,
    factor: 1.0,
};

pub const SHADOW_VERY_SHORT: CandleSetting = CandleSetting {
    range_type: RangeType::HighLow,
    avg_period: 10,
    factor: 0.1,
};

pub const NEAR: CandleSetting = CandleSetting {
    range_type: RangeType::HighLow,
    avg_period: 5,
    factor: 0.2,
};

pub const FAR: CandleSetting = CandleSetting {
    range_type: RangeType::HighLow,
    avg_period: 5,
    factor: 0.6,
};

pub const EQUAL: CandleSetting = CandleSetting {
    range_type: RangeType::HighLow,
    avg_period: 5,
    factor: 0.05,
};

fn measure(bar: &PriceBar, range_type: RangeType) -> f64 {
    match range_type {
        RangeType::RealBody => bar.body(),
        RangeType::HighLow => bar.range(),
        RangeType::Shadows => bar.upper_shadow() + bar.lower_shadow(),
    }
}

/// Threshold of `setting` for the candle at `index`.
///
/// `None` while fewer than `avg_period` bars precede the candle.
pub fn average(bars: &[PriceBar], setting: CandleSetting, index: usize) -> Option<f64> {
    let divisor = if setting.range_type == RangeType::Shadows {
        2.0
    } else {
        1.0
    };

    let bar = bars.get(index)?;
    if setting.avg_period == 0 {
        return Some(setting.factor * measure(bar, setting.range_type) / divisor);
    }

    let start = index.checked_sub(setting.avg_period)?;
    let sum: f64 = bars[start..index]
        .iter()
        .map(|b| measure(b, setting.range_type))
        .sum();
    Some(setting.factor * (sum / setting.avg_period as f64) / divisor)
}

/// +1 for a white candle (close >= open), -1 for a black one.
pub fn color(bar: &PriceBar) -> i32 {
    if bar.close >= bar.open { 1 } else { -1 }
}

/// Real body of `later` sits entirely above the real body of `earlier`.
pub fn body_gap_up(later: &PriceBar, earlier: &PriceBar) -> bool {
    later.body_bottom() > earlier.body_top()
}

/// Real body of `later` sits entirely below the real body of `earlier`.
pub fn body_gap_down(later: &PriceBar, earlier: &PriceBar) -> bool {
    later.body_top() < earlier.body_bottom()
}
