//! JSON-RPC 2.0 endpoint.
//!
//! Method names and payloads mirror the REST routes. Transport-level failures
//! use the standard JSON-RPC codes; service failures use -32602 when the
//! request itself is at fault and -32000 otherwise.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::chain::PipelineRequest;
use crate::domain::error::ScreenerError;
use crate::domain::screener::Screener;

use super::handlers::DownsampleRequest;
use super::{AppState, run_blocking};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const SERVER_ERROR: i64 = -32000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ScreenerError> for RpcError {
    fn from(err: ScreenerError) -> Self {
        let code = match err {
            ScreenerError::UnknownPredicate { .. }
            | ScreenerError::UnknownPattern { .. }
            | ScreenerError::InvalidInterval { .. }
            | ScreenerError::InvalidChain { .. } => INVALID_PARAMS,
            _ => SERVER_ERROR,
        };
        Self::new(code, err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

impl RpcResponse {
    fn reply(id: Value, outcome: Result<Value, RpcError>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(error) => (None, Some(error)),
        };
        Self {
            jsonrpc: "2.0".to_string(),
            result,
            error,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StrategyParams {
    strategy: String,
    interval: String,
}

#[derive(Debug, Deserialize)]
struct PatternParams {
    group: String,
    subgroup: String,
    pattern: String,
    interval: String,
    period: usize,
}

#[derive(Debug, Deserialize)]
struct SymbolPatternParams {
    symbol: String,
    interval: String,
    period: usize,
}

fn params<T: DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::new(INVALID_PARAMS, e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::new(INTERNAL_ERROR, e.to_string()))
}

async fn call<T, F>(state: &AppState, f: F) -> Result<Value, RpcError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Screener) -> Result<T, ScreenerError> + Send + 'static,
{
    let outcome = run_blocking(state, f)
        .await
        .map_err(|e| RpcError::new(INTERNAL_ERROR, format!("worker task failed: {}", e)))?;
    to_value(outcome?)
}

async fn dispatch(state: &AppState, method: &str, raw: Value) -> Result<Value, RpcError> {
    match method {
        "GetStrategies" => to_value(state.screener.strategies()),
        "GetSymbolsForStrategyAndInterval" => {
            let p: StrategyParams = params(raw)?;
            call(state, move |s| s.symbols_for_strategy(&p.strategy, &p.interval)).await
        }
        "GetSymbolsForPattern" => {
            let p: PatternParams = params(raw)?;
            call(state, move |s| {
                s.symbols_with_pattern(&p.group, &p.subgroup, &p.pattern, &p.interval, p.period)
            })
            .await
        }
        "GetPatternsForSymbol" => {
            let p: SymbolPatternParams = params(raw)?;
            call(state, move |s| s.pattern_occurrences(&p.symbol, &p.interval, p.period)).await
        }
        "Downsample" => {
            let p: DownsampleRequest = params(raw)?;
            call(state, move |s| {
                s.write_downsampling(&p.input_interval, &p.output_interval)
            })
            .await
        }
        "RunPipeline" => {
            let p: PipelineRequest = params(raw)?;
            call(state, move |s| s.run_pipeline(&p.strategies)).await
        }
        other => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("method '{}' not found", other),
        )),
    }
}

pub async fn rpc_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<RpcResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = RpcError::new(PARSE_ERROR, rejection.body_text());
            return Json(RpcResponse::reply(Value::Null, Err(error)));
        }
    };
    if request.jsonrpc != "2.0" {
        let error = RpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\"");
        return Json(RpcResponse::reply(request.id, Err(error)));
    }

    info!(method = %request.method, "RPC: called");
    let outcome = dispatch(&state, &request.method, request.params).await;
    if let Err(error) = &outcome {
        warn!(method = %request.method, code = error.code, message = %error.message, "RPC: failed");
    }
    Json(RpcResponse::reply(request.id, outcome))
}
