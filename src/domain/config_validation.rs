//! Configuration validation.
//!
//! Reads every section the service uses through [`ConfigPort`] and turns it
//! into a typed [`ScreenerConfig`], failing on the first bad value.

use crate::domain::downsample::DownsampleSpec;
use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::Interval;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveTime;
use std::net::SocketAddr;
use tracing::level_filters::LevelFilter;
use std::path::PathBuf;

pub const DEFAULT_BASE_INTERVAL: &str = "1d";
pub const DEFAULT_REST_LISTEN: &str = "127.0.0.1:6002";
pub const DEFAULT_RPC_LISTEN: &str = "127.0.0.1:6003";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Bucket origins must stay within the first day.
pub const MAX_OFFSET_MINUTES: i64 = 24 * 60 - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub data_directory: PathBuf,
    pub base_interval: Interval,
    pub rest_listen: SocketAddr,
    pub rpc_listen: SocketAddr,
    pub log_level: String,
    pub log_format: LogFormat,
    pub downsampling: DownsampleSpec,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<ScreenerConfig, ScreenerError> {
    Ok(ScreenerConfig {
        data_directory: validate_data_directory(config)?,
        base_interval: validate_base_interval(config)?,
        rest_listen: validate_listen(config, "rest_listen", DEFAULT_REST_LISTEN)?,
        rpc_listen: validate_listen(config, "rpc_listen", DEFAULT_RPC_LISTEN)?,
        log_level: validate_log_level(config)?,
        log_format: validate_log_format(config)?,
        downsampling: validate_downsampling(config)?,
    })
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_directory(config: &dyn ConfigPort) -> Result<PathBuf, ScreenerError> {
    match config.get_string("data", "directory") {
        Some(s) if !s.trim().is_empty() => Ok(PathBuf::from(s.trim())),
        _ => Err(ScreenerError::ConfigMissing {
            section: "data".to_string(),
            key: "directory".to_string(),
        }),
    }
}

fn validate_base_interval(config: &dyn ConfigPort) -> Result<Interval, ScreenerError> {
    let label = config
        .get_string("data", "base_interval")
        .unwrap_or_else(|| DEFAULT_BASE_INTERVAL.to_string());
    Interval::parse(&label).map_err(|e| invalid("data", "base_interval", e.to_string()))
}

fn validate_listen(
    config: &dyn ConfigPort,
    key: &str,
    default: &str,
) -> Result<SocketAddr, ScreenerError> {
    let value = config
        .get_string("server", key)
        .unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| invalid("server", key, format!("'{}' is not a host:port address", value)))
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<String, ScreenerError> {
    let Some(level) = config.get_string("logging", "level") else {
        return Ok(DEFAULT_LOG_LEVEL.to_string());
    };
    let level = level.trim().to_lowercase();
    if level.is_empty() || level.parse::<LevelFilter>().is_err() {
        return Err(invalid(
            "logging",
            "level",
            "level must be one of trace, debug, info, warn, error or off",
        ));
    }
    Ok(level)
}

fn validate_log_format(config: &dyn ConfigPort) -> Result<LogFormat, ScreenerError> {
    match config.get_string("logging", "format") {
        None => Ok(LogFormat::default()),
        Some(s) => match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(invalid("logging", "format", "format must be json or pretty")),
        },
    }
}

fn parse_time(config: &dyn ConfigPort, key: &str, default: NaiveTime) -> Result<NaiveTime, ScreenerError> {
    match config.get_string("downsampling", key) {
        None => Ok(default),
        Some(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|_| invalid("downsampling", key, format!("invalid {} format, expected HH:MM", key))),
    }
}

fn validate_downsampling(config: &dyn ConfigPort) -> Result<DownsampleSpec, ScreenerError> {
    let defaults = DownsampleSpec::default();

    let offset_minutes = config
        .get_int("downsampling", "offset_minutes")
        .map_err(|_| {
            invalid(
                "downsampling",
                "offset_minutes",
                "offset_minutes must be a whole number",
            )
        })?
        .unwrap_or(defaults.offset_minutes);
    if !(0..=MAX_OFFSET_MINUTES).contains(&offset_minutes) {
        return Err(invalid(
            "downsampling",
            "offset_minutes",
            format!("offset_minutes must be between 0 and {}", MAX_OFFSET_MINUTES),
        ));
    }

    let weekdays_only = config
        .get_bool("downsampling", "weekdays_only")
        .map_err(|_| {
            invalid(
                "downsampling",
                "weekdays_only",
                "weekdays_only must be true or false",
            )
        })?
        .unwrap_or(defaults.weekdays_only);

    let session_start = parse_time(config, "session_start", defaults.session_start)?;
    let session_end = parse_time(config, "session_end", defaults.session_end)?;
    if session_start > session_end {
        return Err(invalid(
            "downsampling",
            "session_start",
            "session_start must not be after session_end",
        ));
    }

    Ok(DownsampleSpec {
        offset_minutes,
        session_start,
        session_end,
        weekdays_only,
    })
}
