//! Named scalar parameters bound to one predicate step.

use crate::domain::error::PredicateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Largest whole-number parameter accepted; bar counts never come close.
pub const MAX_WHOLE_NUMBER: f64 = 1e9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Parameter overrides for one step. Keys are unique; absent keys fall back
/// to the predicate's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepParams(BTreeMap<String, ParamValue>);

impl StepParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Rejects any key not in `allowed`.
    pub fn ensure_only(&self, allowed: &[&str]) -> Result<(), PredicateError> {
        match self.names().find(|name| !allowed.contains(name)) {
            Some(name) => Err(PredicateError::UnexpectedParameter {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn f64_or(&self, name: &str, default: f64) -> Result<f64, PredicateError> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        let number = match value {
            ParamValue::Number(n) => *n,
            ParamValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(name, "expected a number"))?,
        };
        if !number.is_finite() {
            return Err(invalid(name, "must be finite"));
        }
        Ok(number)
    }

    /// A non-negative whole number.
    pub fn usize_or(&self, name: &str, default: usize) -> Result<usize, PredicateError> {
        if self.get(name).is_none() {
            return Ok(default);
        }
        let number = self.f64_or(name, default as f64)?;
        if number < 0.0 || number.fract() != 0.0 {
            return Err(invalid(name, "expected a non-negative whole number"));
        }
        if number > MAX_WHOLE_NUMBER {
            return Err(invalid(name, "too large"));
        }
        Ok(number as usize)
    }

    /// Like `usize_or` but rejects zero.
    pub fn positive_or(&self, name: &str, default: usize) -> Result<usize, PredicateError> {
        let value = self.usize_or(name, default)?;
        if value == 0 {
            return Err(invalid(name, "must be at least 1"));
        }
        Ok(value)
    }

    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, PredicateError> {
        match self.get(name) {
            None => Ok(default),
            Some(ParamValue::Text(s)) => Ok(s.as_str()),
            Some(ParamValue::Number(_)) => Err(invalid(name, "expected a string")),
        }
    }

    pub fn required_str(&self, name: &str) -> Result<&str, PredicateError> {
        match self.get(name) {
            None => Err(PredicateError::MissingParameter {
                name: name.to_string(),
            }),
            Some(ParamValue::Text(s)) => Ok(s.as_str()),
            Some(ParamValue::Number(_)) => Err(invalid(name, "expected a string")),
        }
    }
}

impl fmt::Display for StepParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

fn invalid(name: &str, reason: &str) -> PredicateError {
    PredicateError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
