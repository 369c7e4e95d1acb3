//! Domain error types.

/// Error raised while evaluating one predicate step for one symbol.
///
/// The pipeline absorbs these per symbol; they only surface directly when a
/// predicate is invoked outside the pipeline's guarded loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    #[error("missing required parameter '{name}'")]
    MissingParameter { name: String },

    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unexpected parameter '{name}'")]
    UnexpectedParameter { name: String },

    #[error("no pattern available for group '{group}', subgroup '{subgroup}', pattern '{pattern}'")]
    UnknownPattern {
        group: String,
        subgroup: String,
        pattern: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },
}

impl From<ScreenerError> for PredicateError {
    fn from(err: ScreenerError) -> Self {
        PredicateError::Data {
            reason: err.to_string(),
        }
    }
}

/// Top-level error type for screener.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("malformed data in {path}: {reason}")]
    DataMalformed { path: String, reason: String },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("unknown predicate '{name}'")]
    UnknownPredicate { name: String },

    #[error("no pattern available for group '{group}', subgroup '{subgroup}', pattern '{pattern}'")]
    UnknownPattern {
        group: String,
        subgroup: String,
        pattern: String,
    },

    #[error("invalid interval '{label}': {reason}")]
    InvalidInterval { label: String, reason: String },

    #[error("invalid chain: {reason}")]
    InvalidChain { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) | ScreenerError::Storage { .. } => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::UnknownPredicate { .. }
            | ScreenerError::UnknownPattern { .. }
            | ScreenerError::InvalidChain { .. }
            | ScreenerError::InvalidInterval { .. } => 4,
            ScreenerError::DataMalformed { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
