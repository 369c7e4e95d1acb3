use crate::domain::candlestick::PatternTaxonomy;
use crate::domain::error::PredicateError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::predicate::params::StepParams;
use crate::domain::predicate::{bollinger, candlestick, failed_breakout, macd, pivot, rsi};
use crate::ports::data_port::DataPort;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What a predicate may consult besides the series it is evaluated on.
pub struct PredicateContext<'a> {
    pub symbol: &'a str,
    pub data: &'a dyn DataPort,
    pub taxonomy: &'a PatternTaxonomy,
}

pub type PredicateFn = Arc<
    dyn Fn(&PriceSeries, &StepParams, &PredicateContext<'_>) -> Result<bool, PredicateError>
        + Send
        + Sync,
>;

/// Immutable name -> predicate table, built once and shared by reference.
#[derive(Clone)]
pub struct PredicateLibrary {
    predicates: BTreeMap<String, PredicateFn>,
    taxonomy: Arc<PatternTaxonomy>,
}

impl PredicateLibrary {
    /// A library with no predicates.
    pub fn new(taxonomy: Arc<PatternTaxonomy>) -> Self {
        Self {
            predicates: BTreeMap::new(),
            taxonomy,
        }
    }

    /// Every built-in predicate.
    pub fn standard(taxonomy: Arc<PatternTaxonomy>) -> Self {
        Self::new(taxonomy)
            .with("is_near_lower_bb", bollinger::is_near_lower_bb)
            .with("is_near_upper_bb", bollinger::is_near_upper_bb)
            .with(
                "contains_candlestick_pattern",
                candlestick::contains_candlestick_pattern,
            )
            .with("is_bullish_macd_crossover", macd::is_bullish_macd_crossover)
            .with("is_bearish_macd_crossover", macd::is_bearish_macd_crossover)
            .with(
                "is_last_close_near_pivotpoints",
                pivot::is_last_close_near_pivotpoints,
            )
            .with("is_rsi_overbought", rsi::is_rsi_overbought)
            .with("is_rsi_oversold", rsi::is_rsi_oversold)
            .with("is_rsi_bullish_divergence", rsi::is_rsi_bullish_divergence)
            .with("is_rsi_bearish_divergence", rsi::is_rsi_bearish_divergence)
            .with("is_failed_bo", failed_breakout::is_failed_bo)
            .with("is_failed_blbo", failed_breakout::is_failed_blbo)
            .with("is_failed_brbo", failed_breakout::is_failed_brbo)
    }

    pub fn register<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&PriceSeries, &StepParams, &PredicateContext<'_>) -> Result<bool, PredicateError>
            + Send
            + Sync
            + 'static,
    {
        self.predicates.insert(name.to_string(), Arc::new(predicate));
    }

    pub fn with<F>(mut self, name: &str, predicate: F) -> Self
    where
        F: Fn(&PriceSeries, &StepParams, &PredicateContext<'_>) -> Result<bool, PredicateError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, predicate);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PredicateFn> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.predicates.keys().cloned().collect()
    }

    pub fn taxonomy(&self) -> &PatternTaxonomy {
        &self.taxonomy
    }
}

impl fmt::Debug for PredicateLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateLibrary")
            .field("predicates", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::test_support::{series_from_closes, with_context};

    fn library() -> PredicateLibrary {
        PredicateLibrary::standard(Arc::new(PatternTaxonomy::standard()))
    }

    #[test]
    fn standard_has_thirteen_predicates() {
        let names = library().names();
        assert_eq!(names.len(), 13);
        assert!(names.contains(&"contains_candlestick_pattern".to_string()));
        assert!(names.contains(&"is_failed_bo".to_string()));
    }

    #[test]
    fn names_are_sorted() {
        let names = library().names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn registered_closure_is_callable() {
        let lib = library().with("always_true", |_, _, _| Ok(true));
        let series = series_from_closes(&[1.0]);
        let predicate = lib.get("always_true").unwrap();
        with_context(|ctx| {
            assert!(predicate(&series, &StepParams::new(), ctx).unwrap());
        });
        assert!(!lib.contains("nonexistent_predicate"));
    }
}
