//! Service façade shared by the REST, RPC and command-line front ends.
//!
//! Every operation returns its payload together with a human-readable
//! message, in the shapes the transports serialise directly.

use crate::domain::candlestick::PatternTaxonomy;
use crate::domain::chain::{self, PredicateChain, PredicateStep, Preset};
use crate::domain::downsample::{self, DownsampleSpec};
use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::Interval;
use crate::domain::pattern_scan;
use crate::domain::pipeline::StrategyPipeline;
use crate::domain::predicate::PredicateLibrary;
use crate::domain::universe::Universe;
use crate::ports::data_port::DataPort;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategiesResponse {
    pub message: String,
    pub strategies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolsResponse {
    pub message: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternsResponse {
    pub message: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetsResponse {
    pub message: String,
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub struct Screener {
    data: Arc<dyn DataPort + Send + Sync>,
    pipeline: StrategyPipeline,
    downsampling: DownsampleSpec,
}

impl Screener {
    /// A screener over the standard predicate library.
    pub fn new(
        data: Arc<dyn DataPort + Send + Sync>,
        base_interval: &Interval,
        downsampling: DownsampleSpec,
    ) -> Self {
        let library = PredicateLibrary::standard(Arc::new(PatternTaxonomy::standard()));
        Self::with_library(data, Arc::new(library), base_interval, downsampling)
    }

    pub fn with_library(
        data: Arc<dyn DataPort + Send + Sync>,
        library: Arc<PredicateLibrary>,
        base_interval: &Interval,
        downsampling: DownsampleSpec,
    ) -> Self {
        let pipeline = StrategyPipeline::new(Arc::clone(&data), library, base_interval.label());
        Self {
            data,
            pipeline,
            downsampling,
        }
    }

    pub fn universe(&self) -> &Universe {
        self.pipeline.universe()
    }

    fn taxonomy(&self) -> &PatternTaxonomy {
        self.pipeline.library().taxonomy()
    }

    pub fn strategies(&self) -> StrategiesResponse {
        let strategies = self.pipeline.library().names();
        StrategiesResponse {
            message: format!("Returns {} strategies", strategies.len()),
            strategies,
        }
    }

    /// Runs the single-step chain `strategy@interval` with default parameters.
    pub fn symbols_for_strategy(
        &self,
        strategy: &str,
        interval: &str,
    ) -> Result<SymbolsResponse, ScreenerError> {
        let chain = PredicateChain::new(vec![PredicateStep::new(
            strategy,
            Interval::parse(interval)?,
        )]);
        let symbols = self.pipeline.run(&chain)?.symbols;
        Ok(SymbolsResponse {
            message: format!(
                "Returns {} symbols for strategy '{}' and '{}'",
                symbols.len(),
                strategy,
                interval
            ),
            symbols,
        })
    }

    pub fn symbols_with_pattern(
        &self,
        group: &str,
        subgroup: &str,
        pattern: &str,
        interval: &str,
        period: usize,
    ) -> Result<SymbolsResponse, ScreenerError> {
        let interval = Interval::parse(interval)?;
        let symbols = pattern_scan::symbols_with_pattern(
            self.data.as_ref(),
            self.taxonomy(),
            group,
            subgroup,
            pattern,
            &interval,
            period,
        )?;
        Ok(SymbolsResponse {
            message: format!(
                "Found {} symbols for group '{}', subgroup '{}', pattern '{}', interval '{}' and period '{}'",
                symbols.len(),
                group,
                subgroup,
                pattern,
                interval,
                period
            ),
            symbols,
        })
    }

    pub fn pattern_occurrences(
        &self,
        symbol: &str,
        interval: &str,
        period: usize,
    ) -> Result<PatternsResponse, ScreenerError> {
        let interval = Interval::parse(interval)?;
        let patterns =
            pattern_scan::pattern_occurrences(self.data.as_ref(), symbol, &interval, period)?;
        Ok(PatternsResponse {
            message: format!(
                "Found {} patterns for symbol '{}', interval '{}' and period '{}'",
                patterns.len(),
                symbol,
                interval,
                period
            ),
            patterns,
        })
    }

    pub fn write_downsampling(
        &self,
        input_interval: &str,
        output_interval: &str,
    ) -> Result<MessageResponse, ScreenerError> {
        let message = downsample::write_downsampling(
            self.data.as_ref(),
            &Interval::parse(input_interval)?,
            &Interval::parse(output_interval)?,
            &self.downsampling,
        )?;
        Ok(MessageResponse { message })
    }

    pub fn run_pipeline(&self, chain: &PredicateChain) -> Result<SymbolsResponse, ScreenerError> {
        let symbols = self.pipeline.run(chain)?.symbols;
        Ok(SymbolsResponse {
            message: format!("Found {} symbols for strategies: {}", symbols.len(), chain),
            symbols,
        })
    }

    pub fn presets(&self) -> Result<PresetsResponse, ScreenerError> {
        let presets = chain::presets()?;
        Ok(PresetsResponse {
            message: format!("Returns {} presets", presets.len()),
            presets,
        })
    }
}
