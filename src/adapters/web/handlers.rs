//! REST request handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::domain::chain::PipelineRequest;
use crate::domain::screener::{
    MessageResponse, PatternsResponse, PresetsResponse, StrategiesResponse, SymbolsResponse,
};

use super::{AppState, WebError, run_blocking};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownsampleRequest {
    pub input_interval: String,
    pub output_interval: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_strategies(State(state): State<Arc<AppState>>) -> Json<StrategiesResponse> {
    info!("REST: get_strategies called");
    Json(state.screener.strategies())
}

pub async fn get_symbols_for_strategy_and_interval(
    State(state): State<Arc<AppState>>,
    Path((strategy, interval)): Path<(String, String)>,
) -> Result<Json<SymbolsResponse>, WebError> {
    info!(%strategy, %interval, "REST: get_symbols_for_strategy_and_interval called");
    let response = run_blocking(&state, move |screener| {
        screener.symbols_for_strategy(&strategy, &interval)
    })
    .await??;
    Ok(Json(response))
}

pub async fn get_symbols_for_pattern(
    State(state): State<Arc<AppState>>,
    Path((group, subgroup, pattern, interval, period)): Path<(String, String, String, String, usize)>,
) -> Result<Json<SymbolsResponse>, WebError> {
    info!(%group, %subgroup, %pattern, %interval, period, "REST: get_symbols_for_pattern called");
    let response = run_blocking(&state, move |screener| {
        screener.symbols_with_pattern(&group, &subgroup, &pattern, &interval, period)
    })
    .await??;
    Ok(Json(response))
}

pub async fn get_patterns_for_symbol(
    State(state): State<Arc<AppState>>,
    Path((symbol, interval, period)): Path<(String, String, usize)>,
) -> Result<Json<PatternsResponse>, WebError> {
    info!(%symbol, %interval, period, "REST: get_patterns_for_symbol called");
    let response = run_blocking(&state, move |screener| {
        screener.pattern_occurrences(&symbol, &interval, period)
    })
    .await??;
    Ok(Json(response))
}

pub async fn downsample(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DownsampleRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, WebError> {
    let Json(request) = body.map_err(|e| WebError::bad_request(e.body_text()))?;
    info!(
        input = %request.input_interval,
        output = %request.output_interval,
        "REST: downsample called"
    );
    let response = run_blocking(&state, move |screener| {
        screener.write_downsampling(&request.input_interval, &request.output_interval)
    })
    .await??;
    Ok(Json(response))
}

pub async fn run_pipeline(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PipelineRequest>, JsonRejection>,
) -> Result<Json<SymbolsResponse>, WebError> {
    let Json(request) = body.map_err(|e| WebError::bad_request(e.body_text()))?;
    info!(chain = %request.strategies, "REST: run_pipeline called");
    let response =
        run_blocking(&state, move |screener| screener.run_pipeline(&request.strategies)).await??;
    Ok(Json(response))
}

pub async fn get_presets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PresetsResponse>, WebError> {
    Ok(Json(state.screener.presets()?))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not found")
}
