//! Predicate steps, chains and the preset chains offered to clients.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::Interval;
use crate::domain::predicate::{PredicateLibrary, StepParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One predicate bound to an interval and optional parameter overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateStep {
    #[serde(alias = "predicate")]
    pub strategy: String,
    pub interval: Interval,
    #[serde(default, alias = "parameters")]
    pub params: StepParams,
}

impl PredicateStep {
    pub fn new(strategy: &str, interval: Interval) -> Self {
        Self {
            strategy: strategy.to_string(),
            interval,
            params: StepParams::new(),
        }
    }

    pub fn with_params(mut self, params: StepParams) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Display for PredicateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.strategy, self.interval)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params)?;
        }
        Ok(())
    }
}

/// Ordered steps; evaluation stops at the first failing step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateChain {
    steps: Vec<PredicateStep>,
}

impl PredicateChain {
    pub fn new(steps: Vec<PredicateStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PredicateStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fails on an empty chain or on the first predicate name the library
    /// does not know.
    pub fn validate(&self, library: &PredicateLibrary) -> Result<(), ScreenerError> {
        if self.steps.is_empty() {
            return Err(ScreenerError::InvalidChain {
                reason: "chain has no steps".to_string(),
            });
        }
        match self.steps.iter().find(|s| !library.contains(&s.strategy)) {
            Some(step) => Err(ScreenerError::UnknownPredicate {
                name: step.strategy.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ScreenerError> {
        let request: PipelineRequest =
            serde_json::from_str(json).map_err(|e| ScreenerError::InvalidChain {
                reason: e.to_string(),
            })?;
        Ok(request.strategies)
    }
}

impl fmt::Display for PredicateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", steps.join(" -> "))
    }
}

/// Wire shape shared by every transport: `{"strategies": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub strategies: PredicateChain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub chain: PredicateChain,
}

const BULLISH_PRESET: &str = r#"{
  "strategies": [
    {"strategy":"contains_candlestick_pattern","interval":"1h","params":{"group":"bullish","subgroup":"all","pattern":"all","duration":1}},
    {"strategy":"is_last_close_near_pivotpoints","interval":"1h"},
    {"strategy":"is_rsi_oversold","interval":"5min","params":{"duration":12}},
    {"strategy":"is_near_lower_bb","interval":"5min","params":{"duration":12}},
    {"strategy":"is_bullish_macd_crossover","interval":"5min","params":{"duration":12}},
    {"strategy":"is_rsi_bullish_divergence","interval":"5min","params":{"duration":12}},
    {"strategy":"is_failed_brbo","interval":"5min"}
  ]
}"#;

const BEARISH_PRESET: &str = r#"{
  "strategies": [
    {"strategy":"contains_candlestick_pattern","interval":"1h","params":{"group":"bearish","subgroup":"all","pattern":"all","duration":1}},
    {"strategy":"is_last_close_near_pivotpoints","interval":"1h"},
    {"strategy":"is_rsi_overbought","interval":"5min","params":{"duration":12}},
    {"strategy":"is_near_upper_bb","interval":"5min","params":{"duration":12}},
    {"strategy":"is_bearish_macd_crossover","interval":"5min","params":{"duration":12}},
    {"strategy":"is_rsi_bearish_divergence","interval":"5min","params":{"duration":12}},
    {"strategy":"is_failed_blbo","interval":"5min"}
  ]
}"#;

/// The `bullish` and `bearish` reversal-hunting chains.
pub fn presets() -> Result<Vec<Preset>, ScreenerError> {
    Ok(vec![
        Preset {
            name: "bullish".to_string(),
            chain: PredicateChain::from_json(BULLISH_PRESET)?,
        },
        Preset {
            name: "bearish".to_string(),
            chain: PredicateChain::from_json(BEARISH_PRESET)?,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candlestick::PatternTaxonomy;
    use std::sync::Arc;

    fn library() -> PredicateLibrary {
        PredicateLibrary::standard(Arc::new(PatternTaxonomy::standard()))
    }

    #[test]
    fn parses_wire_shape_with_aliases() {
        let chain = PredicateChain::from_json(
            r#"{"strategies":[
                {"strategy":"is_rsi_oversold","interval":"5min","params":{"duration":14}},
                {"predicate":"is_failed_bo","interval":"5min","parameters":{"max_accept_bars":2}},
                {"strategy":"is_last_close_near_pivotpoints","interval":"1h"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.steps()[1].strategy, "is_failed_bo");
        assert_eq!(
            chain.steps()[1].params.usize_or("max_accept_bars", 3).unwrap(),
            2
        );
        assert!(chain.steps()[2].params.is_empty());
    }

    #[test]
    fn bad_interval_is_invalid_chain() {
        let err = PredicateChain::from_json(
            r#"{"strategies":[{"strategy":"is_rsi_oversold","interval":"soon"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidChain { .. }));
    }

    #[test]
    fn validate_reports_unknown_predicate() {
        let chain = PredicateChain::new(vec![
            PredicateStep::new("is_rsi_oversold", Interval::parse("1d").unwrap()),
            PredicateStep::new("nonexistent_predicate", Interval::parse("1d").unwrap()),
        ]);
        match chain.validate(&library()) {
            Err(ScreenerError::UnknownPredicate { name }) => {
                assert_eq!(name, "nonexistent_predicate")
            }
            other => panic!("Expected UnknownPredicate, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_empty_chain() {
        assert!(matches!(
            PredicateChain::default().validate(&library()),
            Err(ScreenerError::InvalidChain { .. })
        ));
    }

    #[test]
    fn presets_validate_against_standard_library() {
        let presets = presets().unwrap();
        assert_eq!(presets.len(), 2);
        for preset in &presets {
            assert_eq!(preset.chain.len(), 7);
            preset.chain.validate(&library()).unwrap();
        }
    }

    #[test]
    fn display_lists_steps_in_order() {
        let chain = PredicateChain::new(vec![
            PredicateStep::new("is_rsi_oversold", Interval::parse("5min").unwrap())
                .with_params(StepParams::new().with("duration", 14_i64)),
            PredicateStep::new("is_failed_bo", Interval::parse("5min").unwrap()),
        ]);
        assert_eq!(
            chain.to_string(),
            "[is_rsi_oversold@5min(duration=14) -> is_failed_bo@5min]"
        );
    }
}
