//! Strategy pipeline: runs a predicate chain over every symbol of the universe.
//!
//! Each symbol walks the chain in order. A series is loaded only when the
//! step interval differs from the previous step's, and the walk stops at the
//! first step that fails, lacks data, or errors. Errors are absorbed per
//! symbol; only a malformed chain aborts the whole run, and it does so before
//! any symbol is touched.

use crate::domain::chain::{PredicateChain, PredicateStep};
use crate::domain::error::{PredicateError, ScreenerError};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::predicate::{PredicateContext, PredicateFn, PredicateLibrary};
use crate::domain::universe::Universe;
use crate::ports::data_port::DataPort;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a symbol that was not skipped came out of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed { step: usize },
    DataAbsent { step: usize, interval: String },
}

/// Why a symbol was dropped without a verdict.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("loading {interval} data failed: {reason}")]
    LoadFailed { interval: String, reason: String },

    #[error("{predicate} failed: {error}")]
    Evaluation {
        predicate: String,
        error: PredicateError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineResult {
    /// Symbols that passed every step, in universe order.
    pub symbols: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
}

impl PipelineResult {
    pub fn count(&self) -> usize {
        self.symbols.len()
    }
}

/// A chain step paired with the predicate it names.
type ResolvedStep<'c> = (&'c PredicateStep, PredicateFn);

pub struct StrategyPipeline {
    data: Arc<dyn DataPort + Send + Sync>,
    library: Arc<PredicateLibrary>,
    universe: Universe,
}

impl StrategyPipeline {
    /// Builds a pipeline and resolves its universe from `base_interval`.
    pub fn new(
        data: Arc<dyn DataPort + Send + Sync>,
        library: Arc<PredicateLibrary>,
        base_interval: &str,
    ) -> Self {
        let universe = Universe::resolve(data.as_ref(), base_interval);
        Self {
            data,
            library,
            universe,
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn library(&self) -> &PredicateLibrary {
        &self.library
    }

    /// Pairs each step with its predicate; fails before any data is touched.
    fn resolve<'c>(&self, chain: &'c PredicateChain) -> Result<Vec<ResolvedStep<'c>>, ScreenerError> {
        chain.validate(&self.library)?;
        chain
            .steps()
            .iter()
            .map(|step| {
                self.library
                    .get(&step.strategy)
                    .map(|predicate| (step, Arc::clone(predicate)))
                    .ok_or_else(|| ScreenerError::UnknownPredicate {
                        name: step.strategy.clone(),
                    })
            })
            .collect()
    }

    pub fn run(&self, chain: &PredicateChain) -> Result<PipelineResult, ScreenerError> {
        let steps = self.resolve(chain)?;
        let mut result = PipelineResult::default();

        for symbol in self.universe.iter() {
            match self.evaluate_symbol(symbol, &steps) {
                Ok(Verdict::Passed) => result.symbols.push(symbol.to_string()),
                Ok(Verdict::Failed { step }) => {
                    debug!(symbol, step, "Symbol failed chain step");
                }
                Ok(Verdict::DataAbsent { step, interval }) => {
                    debug!(symbol, step, interval = %interval, "No data for chain step");
                }
                Err(reason) => {
                    warn!(symbol, reason = %reason, "Skipping symbol");
                    result.skipped.push(SkippedSymbol {
                        symbol: symbol.to_string(),
                        reason,
                    });
                }
            }
        }

        info!(
            count = result.count(),
            skipped = result.skipped.len(),
            chain = %chain,
            "Pipeline finished"
        );
        Ok(result)
    }

    fn evaluate_symbol(
        &self,
        symbol: &str,
        steps: &[ResolvedStep<'_>],
    ) -> Result<Verdict, SkipReason> {
        let ctx = PredicateContext {
            symbol,
            data: self.data.as_ref(),
            taxonomy: self.library.taxonomy(),
        };
        // (interval label, series) of the most recent load, absent or not.
        let mut loaded: Option<(&str, Option<PriceSeries>)> = None;

        for (index, (step, predicate)) in steps.iter().enumerate() {
            let label = step.interval.label();
            if loaded.as_ref().map(|(l, _)| *l) != Some(label) {
                let series = self
                    .data
                    .load(symbol, label)
                    .map_err(|e| SkipReason::LoadFailed {
                        interval: label.to_string(),
                        reason: e.to_string(),
                    })?;
                loaded = Some((label, series));
            }

            let Some((_, Some(series))) = loaded.as_ref() else {
                return Ok(Verdict::DataAbsent {
                    step: index,
                    interval: label.to_string(),
                });
            };

            let passed = predicate(series, &step.params, &ctx).map_err(|error| {
                SkipReason::Evaluation {
                    predicate: step.strategy.clone(),
                    error,
                }
            })?;
            if !passed {
                return Ok(Verdict::Failed { step: index });
            }
        }

        Ok(Verdict::Passed)
    }
}
