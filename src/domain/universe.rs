//! Symbol universe: the symbols stored at the base interval.
//!
//! Resolved once when a pipeline is built and never refreshed, so files added
//! afterwards stay invisible until the pipeline is rebuilt.

use crate::ports::data_port::DataPort;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    pub symbols: Vec<String>,
    pub base_interval: String,
}

impl Universe {
    /// Lists the base interval's symbols through `data_port`.
    ///
    /// A missing or unreadable folder is not fatal: it is logged and yields an
    /// empty universe.
    pub fn resolve(data_port: &dyn DataPort, base_interval: &str) -> Self {
        let symbols = match data_port.list_symbols(base_interval) {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!(interval = base_interval, error = %e, "Symbol universe unavailable");
                Vec::new()
            }
        };
        debug!(
            interval = base_interval,
            count = symbols.len(),
            "Resolved symbol universe"
        );
        Self {
            symbols,
            base_interval: base_interval.to_string(),
        }
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}
