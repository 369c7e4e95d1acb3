//! CSV file data adapter.
//!
//! Layout: `<base>/<interval>/<interval>-<symbol>.csv`, one file per symbol
//! and interval, with a header row naming the columns.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: [&str; 3] = [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

const HEADER: [&str; 8] = [
    "Symbol",
    "Interval",
    "Timestamp",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
];

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Positions of the known columns within one file's header.
struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
    symbol: Option<usize>,
    interval: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Self, ScreenerError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| malformed(path, format!("missing {} column", name)))
        };
        Ok(Self {
            timestamp: require("Timestamp")?,
            open: require("Open")?,
            high: require("High")?,
            low: require("Low")?,
            close: require("Close")?,
            volume: find("Volume"),
            symbol: find("Symbol"),
            interval: find("Interval"),
        })
    }
}

fn malformed(path: &Path, reason: impl Into<String>) -> ScreenerError {
    ScreenerError::DataMalformed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn interval_dir(&self, interval: &str) -> PathBuf {
        self.base_path.join(interval)
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.interval_dir(interval)
            .join(format!("{}-{}.csv", interval, symbol))
    }

    fn read_bars(&self, path: &Path, symbol: &str, interval: &str) -> Result<Vec<PriceBar>, ScreenerError> {
        let mut rdr = csv::Reader::from_path(path).map_err(|e| ScreenerError::Storage {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let headers = rdr
            .headers()
            .map_err(|e| malformed(path, format!("unreadable header: {}", e)))?
            .clone();
        let columns = Columns::resolve(&headers, path)?;

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let line = row + 2;
            let record =
                result.map_err(|e| malformed(path, format!("CSV parse error at line {}: {}", line, e)))?;
            let cell = |index: usize| record.get(index).map(str::trim).unwrap_or("");
            let price = |index: usize, name: &str| -> Result<f64, ScreenerError> {
                let value: f64 = cell(index).parse().map_err(|_| {
                    malformed(path, format!("invalid {} value '{}' at line {}", name, cell(index), line))
                })?;
                if !value.is_finite() {
                    return Err(malformed(path, format!("non-finite {} at line {}", name, line)));
                }
                Ok(value)
            };

            let timestamp = parse_timestamp(cell(columns.timestamp)).ok_or_else(|| {
                malformed(
                    path,
                    format!("invalid timestamp '{}' at line {}", cell(columns.timestamp), line),
                )
            })?;
            let high = price(columns.high, "High")?;
            let low = price(columns.low, "Low")?;
            if high < low {
                return Err(malformed(path, format!("high below low at line {}", line)));
            }
            let volume = match columns.volume {
                Some(index) if !cell(index).is_empty() => price(index, "Volume")?,
                _ => 0.0,
            };
            let text_or = |index: Option<usize>, default: &str| {
                index
                    .map(cell)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(default)
                    .to_string()
            };

            bars.push(PriceBar {
                symbol: text_or(columns.symbol, symbol),
                interval: text_or(columns.interval, interval),
                timestamp,
                open: price(columns.open, "Open")?,
                high,
                low,
                close: price(columns.close, "Close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(malformed(
                path,
                format!("duplicate timestamp {}", pair[0].timestamp.format(TIMESTAMP_FORMAT)),
            ));
        }
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn load(&self, symbol: &str, interval: &str) -> Result<Option<PriceSeries>, ScreenerError> {
        let path = self.csv_path(symbol, interval);
        if !path.is_file() {
            return Ok(None);
        }
        let bars = self.read_bars(&path, symbol, interval)?;
        Ok(Some(PriceSeries::new(symbol, interval, bars)))
    }

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, ScreenerError> {
        let dir = self.interval_dir(interval);
        let entries = fs::read_dir(&dir).map_err(|e| ScreenerError::Storage {
            reason: format!("failed to read directory {}: {}", dir.display(), e),
        })?;

        let prefix = format!("{}-", interval);
        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let symbol = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".csv"));
            if let Some(symbol) = symbol.filter(|s| !s.is_empty()) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn store(&self, series: &PriceSeries) -> Result<(), ScreenerError> {
        fs::create_dir_all(self.interval_dir(&series.interval))?;
        let path = self.csv_path(&series.symbol, &series.interval);
        let storage = |e: csv::Error| ScreenerError::Storage {
            reason: format!("failed to write {}: {}", path.display(), e),
        };

        let mut writer = csv::Writer::from_path(&path).map_err(storage)?;
        writer.write_record(HEADER).map_err(storage)?;
        for bar in &series.bars {
            writer
                .write_record([
                    bar.symbol.clone(),
                    series.interval.clone(),
                    bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    bar.open.to_string(),
                    bar.high.to_string(),
                    bar.low.to_string(),
                    bar.close.to_string(),
                    bar.volume.to_string(),
                ])
                .map_err(storage)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, interval: &str, file: &str, content: &str) {
        let folder = dir.join(interval);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(file), content).unwrap();
    }

    fn setup_test_data() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "1d",
            "1d-BHP.csv",
            "Symbol,Interval,Timestamp,Open,High,Low,Close,Volume\n\
             BHP,1d,2024-01-16 00:00:00,105.0,115.0,100.0,110.0,60000\n\
             BHP,1d,2024-01-15 00:00:00,100.0,110.0,90.0,105.0,50000\n",
        );
        write(dir.path(), "1d", "1d-CBA.csv", "timestamp,open,high,low,close\n");
        write(dir.path(), "1d", "notes.txt", "ignored");
        write(dir.path(), "1d", "1h-WBC.csv", "ignored");
        write(dir.path(), "1d", "1d-.csv", "ignored");
        dir
    }

    #[test]
    fn load_sorts_rows_and_reads_columns_by_name() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let series = adapter.load("BHP", "1d").unwrap().unwrap();
        assert_eq!(series.len(), 2);
        let first = &series.bars[0];
        assert_eq!(
            first.timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 50000.0);
        assert_eq!(first.symbol, "BHP");
    }

    #[test]
    fn load_missing_file_is_absent() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(adapter.load("TSLA", "1d").unwrap().is_none());
        assert!(adapter.load("BHP", "5min").unwrap().is_none());
    }

    #[test]
    fn header_only_file_is_empty_series() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let series = adapter.load("CBA", "1d").unwrap().unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn accepts_alternative_timestamp_formats() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "5min",
            "5min-AAPL.csv",
            "Timestamp,Open,High,Low,Close\n\
             2024-01-15T09:15:00,1,2,0.5,1.5\n\
             2024-01-15 09:20,1,2,0.5,1.5\n\
             2024-01-14,1,2,0.5,1.5\n",
        );
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let series = adapter.load("AAPL", "5min").unwrap().unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars[0].date(), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(series.bars[0].volume, 0.0);
        assert_eq!(series.bars[2].interval, "5min");
    }

    #[test]
    fn missing_required_column_is_malformed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "1d", "1d-X.csv", "Timestamp,Open,High,Low\n2024-01-15,1,2,0.5\n");
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.load("X", "1d").unwrap_err();
        assert!(
            matches!(err, ScreenerError::DataMalformed { reason, .. } if reason.contains("Close"))
        );
    }

    #[test]
    fn rejects_bad_rows() {
        let dir = TempDir::new().unwrap();
        let header = "Timestamp,Open,High,Low,Close\n";
        write(dir.path(), "1d", "1d-DUP.csv", &format!("{header}2024-01-15,1,2,0.5,1\n2024-01-15,1,2,0.5,1\n"));
        write(dir.path(), "1d", "1d-INV.csv", &format!("{header}2024-01-15,1,0.5,2,1\n"));
        write(dir.path(), "1d", "1d-NAN.csv", &format!("{header}2024-01-15,1,2,0.5,NaN\n"));
        write(dir.path(), "1d", "1d-TXT.csv", &format!("{header}2024-01-15,one,2,0.5,1\n"));
        write(dir.path(), "1d", "1d-TS.csv", &format!("{header}15/01/2024,1,2,0.5,1\n"));
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        for symbol in ["DUP", "INV", "NAN", "TXT", "TS"] {
            assert!(
                matches!(adapter.load(symbol, "1d"), Err(ScreenerError::DataMalformed { .. })),
                "{} should be malformed",
                symbol
            );
        }
    }

    #[test]
    fn list_symbols_filters_by_naming_convention() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(adapter.list_symbols("1d").unwrap(), vec!["BHP", "CBA"]);
    }

    #[test]
    fn list_symbols_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(matches!(
            adapter.list_symbols("1d"),
            Err(ScreenerError::Storage { .. })
        ));
    }

    #[test]
    fn store_then_load_keeps_bars() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let mut series = adapter.load("BHP", "1d").unwrap().unwrap();
        series.interval = "1w".into();

        adapter.store(&series).unwrap();
        assert!(dir.path().join("1w").join("1w-BHP.csv").is_file());
        let reloaded = adapter.load("BHP", "1w").unwrap().unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.bars[1].close, 110.0);
        assert_eq!(reloaded.bars[1].interval, "1w");
    }
}
