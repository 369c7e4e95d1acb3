//! Data access port trait.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::PriceSeries;

pub trait DataPort {
    /// Loads the series stored for `symbol` at `interval`.
    ///
    /// `Ok(None)` means no file exists for the pair, which is an expected
    /// outcome. Unreadable or malformed content is an error.
    fn load(&self, symbol: &str, interval: &str) -> Result<Option<PriceSeries>, ScreenerError>;

    /// Symbols with a stored series at `interval`, sorted.
    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, ScreenerError>;

    /// Persists `series` under its own interval, replacing any previous file.
    fn store(&self, series: &PriceSeries) -> Result<(), ScreenerError>;
}
