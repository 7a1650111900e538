//! # Tracker Server
//!
//! HTTP API serving prediction-market trader statistics and derived
//! performance metrics. Upstream lookups go through per-wallet TTL caches so
//! repeated and concurrent requests for the same wallet cost one upstream
//! round-trip per TTL window.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod service;
pub mod source;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::TraderService;

pub use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub service: TraderService,
}

/// Router with all routes and middleware applied
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::panic_response))
        .with_state(state)
}
