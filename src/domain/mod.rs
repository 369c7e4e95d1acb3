//! Core domain types and logic.

pub mod candlestick;
pub mod chain;
pub mod config_validation;
pub mod downsample;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod pattern_scan;
pub mod pipeline;
pub mod predicate;
pub mod screener;
pub mod universe;
