//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 12;
pub const DEFAULT_NBDEV: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(bars: &[PriceBar], period: usize, nbdev: f64) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = bollinger_values(&closes, period, nbdev)
        .into_iter()
        .zip(bars)
        .map(|(bands, bar)| {
            let b = bands.unwrap_or(Bands {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
            });
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: bands.is_some(),
                value: IndicatorValue::Bollinger {
                    upper: b.upper,
                    middle: b.middle,
                    lower: b.lower,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (nbdev * 100.0).round().max(0.0) as u32,
        },
        values,
    }
}

pub fn bollinger_values(closes: &[f64], period: usize, nbdev: f64) -> Vec<Option<Bands>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    for (i, window) in closes.windows(period).enumerate() {
        let middle = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|c| {
                let diff = c - middle;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        out[i + period - 1] = Some(Bands {
            upper: middle + nbdev * stddev,
            middle,
            lower: middle - nbdev * stddev,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_warmup() {
        let values = bollinger_values(&[10.0, 20.0, 30.0, 40.0, 50.0], 3, 2.0);

        assert!(values[0].is_none());
        assert!(values[1].is_none());
        assert!(values[2].is_some());
        assert!(values[4].is_some());
    }

    #[test]
    fn bollinger_constant_values() {
        let values = bollinger_values(&[100.0; 5], 3, 2.0);
        let bands = values[2].unwrap();
        assert!((bands.middle - 100.0).abs() < f64::EPSILON);
        assert!((bands.upper - 100.0).abs() < f64::EPSILON);
        assert!((bands.lower - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let values = bollinger_values(&[10.0, 20.0, 30.0], 3, 2.0);
        let bands = values[2].unwrap();

        let expected_middle: f64 = 20.0;
        let variance: f64 = (100.0 + 0.0 + 100.0) / 3.0;
        let stddev = variance.sqrt();

        assert!((bands.middle - expected_middle).abs() < 1e-10);
        assert!((bands.upper - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((bands.lower - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let bands = bollinger_values(&[10.0, 20.0, 30.0], 3, 1.5)[2].unwrap();
        let upper_dist = bands.upper - bands.middle;
        let lower_dist = bands.middle - bands.lower;
        assert!((upper_dist - lower_dist).abs() < 1e-10);
    }

    #[test]
    fn bollinger_short_series() {
        assert!(bollinger_values(&[10.0, 20.0], 3, 2.0)
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn bollinger_indicator_type_rounds_multiplier() {
        let series = calculate_bollinger(&[], 12, 2.0);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Bollinger {
                period: 12,
                stddev_mult_x100: 200
            }
        );
    }
}
