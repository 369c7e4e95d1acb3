//! HTTP transports: a JSON REST API and a JSON-RPC 2.0 endpoint.
//!
//! Both forward to one shared [`Screener`]. Screening reads files and runs
//! synchronously, so every service call is moved onto the blocking pool.

mod error;
mod handlers;
mod rpc;

pub use error::{WebError, status_from_error};
pub use handlers::*;
pub use rpc::{RpcError, RpcRequest, RpcResponse, rpc_handler};

use axum::{
    Router,
    routing::{get, post},
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, HttpMakeClassifier, TraceLayer,
};
use tracing::{Level, info};

use crate::domain::error::ScreenerError;
use crate::domain::screener::Screener;

#[derive(Clone)]
pub struct AppState {
    pub screener: Arc<Screener>,
}

impl AppState {
    pub fn new(screener: Screener) -> Self {
        Self {
            screener: Arc::new(screener),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/strategies", get(handlers::get_strategies))
        .route(
            "/strategy/{strategy}/{interval}",
            get(handlers::get_symbols_for_strategy_and_interval),
        )
        .route(
            "/patterns/{group}/{subgroup}/{pattern}/{interval}/{period}",
            get(handlers::get_symbols_for_pattern),
        )
        .route(
            "/patterns/symbol/{symbol}/{interval}/{period}",
            get(handlers::get_patterns_for_symbol),
        )
        .route("/downsample", post(handlers::downsample))
        .route("/pipeline/run", post(handlers::run_pipeline))
        .route("/pipeline/presets", get(handlers::get_presets))
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(request_tracing())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

pub fn build_rpc_router(state: AppState) -> Router {
    Router::new()
        .route("/rpc", post(rpc::rpc_handler))
        .layer(request_tracing())
        .with_state(Arc::new(state))
}

/// Per-request spans at debug level.
fn request_tracing() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}

/// Runs `call` against the screener on the blocking pool.
pub(crate) async fn run_blocking<T, F>(
    state: &AppState,
    call: F,
) -> Result<Result<T, ScreenerError>, tokio::task::JoinError>
where
    T: Send + 'static,
    F: FnOnce(&Screener) -> Result<T, ScreenerError> + Send + 'static,
{
    let screener = Arc::clone(&state.screener);
    tokio::task::spawn_blocking(move || call(&screener)).await
}

/// Serves REST on `rest_addr` and JSON-RPC on `rpc_addr` until either stops.
pub async fn serve(
    state: AppState,
    rest_addr: SocketAddr,
    rpc_addr: SocketAddr,
) -> Result<(), ScreenerError> {
    let rest = tokio::net::TcpListener::bind(rest_addr).await?;
    let rpc = tokio::net::TcpListener::bind(rpc_addr).await?;
    info!(%rest_addr, "REST server listening");
    info!(%rpc_addr, "RPC server listening");

    let rest_app = build_router(state.clone());
    let rpc_app = build_rpc_router(state);
    tokio::try_join!(
        axum::serve(rest, rest_app).into_future(),
        axum::serve(rpc, rpc_app).into_future()
    )?;
    Ok(())
}
