//! Candlestick queries across the stored universe and for a single symbol.

use crate::domain::candlestick::{CandlePattern, PatternTaxonomy};
use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::Interval;
use crate::ports::data_port::DataPort;
use tracing::{info, warn};

pub const OCCURRENCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Symbols stored at `interval` on which a selected pattern fired, in the
/// group's direction, within the last `period` bars.
///
/// A symbol whose file cannot be read is logged and left out.
pub fn symbols_with_pattern(
    data: &dyn DataPort,
    taxonomy: &PatternTaxonomy,
    group: &str,
    subgroup: &str,
    pattern: &str,
    interval: &Interval,
    period: usize,
) -> Result<Vec<String>, ScreenerError> {
    let selection =
        taxonomy
            .select(group, subgroup, pattern)
            .ok_or_else(|| ScreenerError::UnknownPattern {
                group: group.to_string(),
                subgroup: subgroup.to_string(),
                pattern: pattern.to_string(),
            })?;

    let mut symbols = Vec::new();
    for symbol in data.list_symbols(interval.label())? {
        let series = match data.load(&symbol, interval.label()) {
            Ok(Some(series)) => series,
            Ok(None) => continue,
            Err(e) => {
                warn!(symbol = %symbol, interval = %interval, error = %e, "Skipping symbol");
                continue;
            }
        };
        if selection.fires_within(&series.bars, period) {
            symbols.push(symbol);
        }
    }

    info!(
        count = symbols.len(),
        group,
        subgroup,
        pattern,
        interval = %interval,
        period,
        "Pattern scan finished"
    );
    Ok(symbols)
}

/// Every `"<timestamp> - <CDLNAME>"` where a known pattern fired within the
/// last `period` bars of the symbol's series, sorted.
///
/// A symbol with no file at `interval` has no occurrences.
pub fn pattern_occurrences(
    data: &dyn DataPort,
    symbol: &str,
    interval: &Interval,
    period: usize,
) -> Result<Vec<String>, ScreenerError> {
    let Some(series) = data.load(symbol, interval.label())? else {
        warn!(symbol, interval = %interval, "No data file for symbol");
        return Ok(Vec::new());
    };

    let start = series.len() - series.window(period);
    let mut occurrences = Vec::new();
    for pattern in CandlePattern::ALL {
        let signals = pattern.detect(&series.bars);
        for (bar, signal) in series.bars[start..].iter().zip(&signals[start..]) {
            if *signal != 0 {
                occurrences.push(format!(
                    "{} - {}",
                    bar.timestamp.format(OCCURRENCE_TIMESTAMP_FORMAT),
                    pattern.name()
                ));
            }
        }
    }
    occurrences.sort();

    info!(
        count = occurrences.len(),
        symbol,
        interval = %interval,
        period,
        "Pattern occurrences collected"
    );
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceSeries;
    use crate::domain::predicate::test_support::{bars_from_ohlc, MemoryPort};

    fn daily() -> Interval {
        Interval::parse("1d").unwrap()
    }

    fn series(symbol: &str, bullish: bool) -> PriceSeries {
        let mut ohlc = vec![(100.0, 101.5, 99.5, 101.0); 10];
        if bullish {
            ohlc.push((101.0, 101.2, 99.8, 100.0));
            ohlc.push((99.5, 102.0, 99.4, 101.8));
        } else {
            ohlc.push((100.0, 101.2, 99.8, 101.0));
            ohlc.push((101.5, 101.6, 99.0, 99.5));
        }
        let mut bars = bars_from_ohlc(&ohlc);
        for bar in &mut bars {
            bar.symbol = symbol.into();
        }
        PriceSeries::new(symbol, "1d", bars)
    }

    fn port() -> MemoryPort {
        MemoryPort::default()
            .insert(series("AAPL", true))
            .insert(series("TSLA", false))
    }

    #[test]
    fn scan_respects_group_direction() {
        let taxonomy = PatternTaxonomy::standard();
        let data = port();
        let bullish =
            symbols_with_pattern(&data, &taxonomy, "bullish", "all", "CDLENGULFING", &daily(), 3)
                .unwrap();
        let bearish =
            symbols_with_pattern(&data, &taxonomy, "bearish", "all", "CDLENGULFING", &daily(), 3)
                .unwrap();
        assert_eq!(bullish, vec!["AAPL"]);
        assert_eq!(bearish, vec!["TSLA"]);
    }

    #[test]
    fn scan_rejects_unknown_selection() {
        let taxonomy = PatternTaxonomy::standard();
        let err = symbols_with_pattern(&port(), &taxonomy, "bullish", "all", "CDLNOPE", &daily(), 3)
            .unwrap_err();
        assert!(matches!(err, ScreenerError::UnknownPattern { .. }));
    }

    #[test]
    fn occurrences_are_formatted_and_sorted() {
        let found = pattern_occurrences(&port(), "AAPL", &daily(), 1).unwrap();
        assert!(found.contains(&"2024-01-12 00:00:00 - CDLENGULFING".to_string()));
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
        assert!(found.iter().all(|o| o.starts_with("2024-01-12")));
    }

    #[test]
    fn occurrences_for_missing_symbol_are_empty() {
        assert!(pattern_occurrences(&port(), "MSFT", &daily(), 5)
            .unwrap()
            .is_empty());
    }
}
