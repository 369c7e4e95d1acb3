#![cfg(feature = "web")]
//! REST and JSON-RPC router tests.
//!
//! Tests cover:
//! - Every REST route's status code and JSON payload
//! - Error mapping (unknown predicate, bad interval, malformed body)
//! - JSON-RPC dispatch, parameter errors and unknown methods

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use screener::adapters::web::{AppState, build_router, build_rpc_router};
use screener::domain::downsample::DownsampleSpec;
use screener::domain::ohlcv::Interval;
use screener::domain::screener::Screener;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use common::*;

fn state() -> AppState {
    let port = MockDataPort::new()
        .with_bars("AAPL", "1d", daily_bars("AAPL", 30, 50.0, 1.0))
        .with_bars("TSLA", "1d", daily_bars("TSLA", 30, 200.0, -1.0))
        .with_bars(
            "AAPL",
            "5min",
            generate_bars("AAPL", "5min", "2024-03-04 09:15:00", 5, 24, 100.0, 0.1),
        );
    let screener = Screener::with_library(
        Arc::new(port),
        Arc::new(test_library()),
        &Interval::parse("1d").unwrap(),
        DownsampleSpec::default(),
    );
    AppState::new(screener)
}

fn rest_app() -> Router {
    build_router(state())
}

fn rpc_app() -> Router {
    build_rpc_router(state())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn rpc(method: &str, params: Value) -> Value {
    let body = json!({"jsonrpc": "2.0", "method": method, "params": params, "id": 7});
    let (status, value) = post(rpc_app(), "/rpc", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["id"], 7);
    value
}

mod rest {
    use super::*;

    #[tokio::test]
    async fn health_is_plain_ok() {
        let response = rest_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn strategies_lists_library() {
        let (status, body) = get(rest_app(), "/strategies").await;
        assert_eq!(status, StatusCode::OK);
        let names = body["strategies"].as_array().unwrap();
        assert_eq!(names.len(), 17);
        assert_eq!(body["message"], "Returns 17 strategies");
    }

    #[tokio::test]
    async fn strategy_route_screens_universe() {
        let (status, body) = get(rest_app(), "/strategy/is_rsi_overbought/1d").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbols"], json!(["AAPL"]));
    }

    #[tokio::test]
    async fn unknown_strategy_is_bad_request() {
        let (status, body) = get(rest_app(), "/strategy/nonexistent_predicate/1d").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown predicate 'nonexistent_predicate'");
    }

    #[tokio::test]
    async fn bad_interval_is_bad_request() {
        let (status, _) = get(rest_app(), "/strategy/always_true/fortnight").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overlong_interval_is_bad_request() {
        let (status, body) = get(rest_app(), "/strategy/always_true/1000000000000000w").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("too long"));
    }

    #[tokio::test]
    async fn pattern_scan_with_unknown_group_is_bad_request() {
        let (status, _) = get(rest_app(), "/patterns/sideways/all/all/1d/12").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pattern_scan_returns_message() {
        let (status, body) = get(rest_app(), "/patterns/all/all/all/1d/5").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["symbols"].is_array());
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .ends_with("interval '1d' and period '5'")
        );
    }

    #[tokio::test]
    async fn patterns_for_absent_symbol_are_empty() {
        let (status, body) = get(rest_app(), "/patterns/symbol/NOPE/1d/12").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patterns"], json!([]));
    }

    #[tokio::test]
    async fn downsample_reports_intervals() {
        let (status, body) = post(
            rest_app(),
            "/downsample",
            r#"{"input_interval":"5min","output_interval":"1h"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Downsampled from 5min to 1h");
    }

    #[tokio::test]
    async fn downsample_to_finer_interval_is_rejected() {
        let (status, _) = post(
            rest_app(),
            "/downsample",
            r#"{"input_interval":"1h","output_interval":"5min"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pipeline_run_filters_symbols() {
        let body = r#"{"strategies":[
            {"strategy":"always_true","interval":"1d"},
            {"strategy":"close_above","interval":"1d","params":{"threshold":100}}
        ]}"#;
        let (status, body) = post(rest_app(), "/pipeline/run", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbols"], json!(["TSLA"]));
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Found 1 symbols for strategies:")
        );
    }

    #[tokio::test]
    async fn pipeline_run_with_empty_chain_is_bad_request() {
        let (status, _) = post(rest_app(), "/pipeline/run", r#"{"strategies":[]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_pipeline_body_is_bad_request() {
        let (status, body) = post(rest_app(), "/pipeline/run", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn presets_are_served() {
        let (status, body) = get(rest_app(), "/pipeline/presets").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["presets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _) = get(rest_app(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod json_rpc {
    use super::*;

    #[tokio::test]
    async fn get_strategies() {
        let reply = rpc("GetStrategies", Value::Null).await;
        assert_eq!(reply["jsonrpc"], "2.0");
        assert_eq!(reply["result"]["strategies"].as_array().unwrap().len(), 17);
    }

    #[tokio::test]
    async fn symbols_for_strategy_and_interval() {
        let reply = rpc(
            "GetSymbolsForStrategyAndInterval",
            json!({"strategy": "is_rsi_oversold", "interval": "1d"}),
        )
        .await;
        assert_eq!(reply["result"]["symbols"], json!(["TSLA"]));
    }

    #[tokio::test]
    async fn run_pipeline() {
        let reply = rpc(
            "RunPipeline",
            json!({"strategies": [{"strategy": "always_true", "interval": "1d"}]}),
        )
        .await;
        assert_eq!(reply["result"]["symbols"], json!(["AAPL", "TSLA"]));
    }

    #[tokio::test]
    async fn patterns_for_symbol() {
        let reply = rpc(
            "GetPatternsForSymbol",
            json!({"symbol": "AAPL", "interval": "1d", "period": 3}),
        )
        .await;
        assert!(reply["result"]["patterns"].is_array());
    }

    #[tokio::test]
    async fn unknown_predicate_is_invalid_params() {
        let reply = rpc(
            "RunPipeline",
            json!({"strategies": [{"strategy": "nonexistent_predicate", "interval": "1d"}]}),
        )
        .await;
        assert_eq!(reply["error"]["code"], -32602);
        assert!(reply.get("result").is_none());
    }

    #[tokio::test]
    async fn missing_params_are_invalid_params() {
        let reply = rpc("GetSymbolsForPattern", json!({"group": "bullish"})).await;
        assert_eq!(reply["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let reply = rpc("Frobnicate", Value::Null).await;
        assert_eq!(reply["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn wrong_protocol_version_is_invalid_request() {
        let body = json!({"jsonrpc": "1.0", "method": "GetStrategies", "id": 1});
        let (_, reply) = post(rpc_app(), "/rpc", &body.to_string()).await;
        assert_eq!(reply["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn unparseable_body_is_parse_error() {
        let (status, reply) = post(rpc_app(), "/rpc", "{oops").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["error"]["code"], -32700);
        assert_eq!(reply["id"], Value::Null);
    }
}
