//! Named boolean tests over a price series.
//!
//! Every predicate shares one signature and is pure: it reads the series, its
//! step parameters and the read-only context, and never raises for a series
//! that is merely too short (it answers `false` instead). Structurally invalid
//! parameters surface as `PredicateError`.

pub mod bollinger;
pub mod candlestick;
pub mod failed_breakout;
pub mod library;
pub mod macd;
pub mod params;
pub mod pivot;
pub mod rsi;

pub use library::{PredicateContext, PredicateFn, PredicateLibrary};
pub use params::{ParamValue, StepParams};

/// Default number of most-recent bars scanned for a signal.
pub const DEFAULT_DURATION: usize = 12;
