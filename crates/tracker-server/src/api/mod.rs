pub mod dto;
pub mod handlers;

use axum::{routing::get, Router};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Trader endpoints
        .route("/traders/{address}", get(handlers::get_trader_stats))
        .route("/traders/{address}/performance", get(handlers::get_trader_performance))
        .route("/traders/{address}/positions", get(handlers::get_trader_positions))
}
