//! Aggregation of a series into a coarser interval.
//!
//! Buckets are anchored at midnight of the first bar's day shifted by
//! `offset_minutes`, so with the default offset hourly buckets start at HH:15.
//! Each bucket is labelled by its start time.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::{Interval, PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct DownsampleSpec {
    pub offset_minutes: i64,
    pub session_start: NaiveTime,
    pub session_end: NaiveTime,
    pub weekdays_only: bool,
}

impl Default for DownsampleSpec {
    fn default() -> Self {
        Self {
            offset_minutes: 15,
            session_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            session_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            weekdays_only: true,
        }
    }
}

impl DownsampleSpec {
    fn keeps(&self, label: NaiveDateTime, target: &Interval) -> bool {
        if self.weekdays_only && matches!(label.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        if target.is_intraday() {
            let time = label.time();
            return time >= self.session_start && time <= self.session_end;
        }
        true
    }
}

fn ensure_coarser(source: &Interval, target: &Interval) -> Result<(), ScreenerError> {
    if target.minutes() <= source.minutes() {
        return Err(ScreenerError::InvalidInterval {
            label: target.to_string(),
            reason: format!("must be coarser than {}", source),
        });
    }
    Ok(())
}

fn bucket_start(timestamp: NaiveDateTime, origin: NaiveDateTime, width: i64) -> NaiveDateTime {
    let elapsed = (timestamp - origin).num_minutes();
    origin + Duration::minutes(elapsed.div_euclid(width) * width)
}

/// Aggregates `series` into `target` bars: open first, high max, low min,
/// close last, volume summed.
pub fn downsample(
    series: &PriceSeries,
    target: &Interval,
    spec: &DownsampleSpec,
) -> Result<PriceSeries, ScreenerError> {
    let source = Interval::parse(&series.interval)?;
    ensure_coarser(&source, target)?;

    let Some(first) = series.bars.first() else {
        return Ok(PriceSeries::new(&series.symbol, target.label(), Vec::new()));
    };
    let origin = first.date().and_time(NaiveTime::MIN) + Duration::minutes(spec.offset_minutes);
    let width = target.minutes();

    let mut bars: Vec<PriceBar> = Vec::new();
    for bar in &series.bars {
        let label = bucket_start(bar.timestamp, origin, width);
        match bars.last_mut() {
            Some(current) if current.timestamp == label => {
                current.high = current.high.max(bar.high);
                current.low = current.low.min(bar.low);
                current.close = bar.close;
                current.volume += bar.volume;
            }
            _ => bars.push(PriceBar {
                symbol: series.symbol.clone(),
                interval: target.label().to_string(),
                timestamp: label,
                ..bar.clone()
            }),
        }
    }
    bars.retain(|bar| spec.keeps(bar.timestamp, target));

    info!(
        symbol = %series.symbol,
        interval = %target,
        offset_minutes = spec.offset_minutes,
        bars = bars.len(),
        "Downsampled series"
    );
    Ok(PriceSeries::new(&series.symbol, target.label(), bars))
}

/// Downsamples every symbol stored at `input` and stores the results at
/// `output`, replacing earlier files.
pub fn write_downsampling(
    data: &dyn DataPort,
    input: &Interval,
    output: &Interval,
    spec: &DownsampleSpec,
) -> Result<String, ScreenerError> {
    ensure_coarser(input, output)?;
    for symbol in data.list_symbols(input.label())? {
        let Some(series) = data.load(&symbol, input.label())? else {
            continue;
        };
        let resampled = downsample(&series, output, spec)?;
        if !resampled.is_empty() {
            data.store(&resampled)?;
        }
    }

    let message = format!("Downsampled from {} to {}", input, output);
    info!("{}", message);
    Ok(message)
}
