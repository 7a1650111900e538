use axum::{
    extract::{Path, State},
    Json,
};
use std::time::Instant;

use tracker_core::{TraderPerformance, TraderPositions, TraderProfile};

use super::dto::*;
use crate::error::AppResult;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.service.cache_stats();
    tracing::debug!(
        performance_entries = cache.performance,
        positions_entries = cache.positions,
        stats_entries = cache.stats,
        "Health check"
    );

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: cache.into(),
    })
}

pub async fn get_trader_performance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<TraderPerformance>> {
    let start = Instant::now();
    tracing::info!(wallet = %address, "Processing trader performance request");

    let result = state.service.get_performance(&address).await?;

    tracing::info!(
        wallet = %result.address,
        duration_ms = %start.elapsed().as_millis(),
        total_pnl = %result.performance.total_pnl,
        roi = %result.performance.roi,
        "Trader performance served"
    );

    Ok(Json(result))
}

pub async fn get_trader_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<TraderProfile>> {
    let start = Instant::now();
    tracing::info!(wallet = %address, "Processing trader stats request");

    let result = state.service.get_stats(&address).await?;

    tracing::info!(
        wallet = %result.address,
        duration_ms = %start.elapsed().as_millis(),
        ranked = result.stats.rank.is_some(),
        "Trader stats served"
    );

    Ok(Json(result))
}

pub async fn get_trader_positions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<TraderPositions>> {
    let start = Instant::now();
    tracing::info!(wallet = %address, "Processing trader positions request");

    let result = state.service.get_positions(&address).await?;

    tracing::info!(
        wallet = %result.address,
        duration_ms = %start.elapsed().as_millis(),
        open = result.open.len(),
        closed = result.closed.len(),
        "Trader positions served"
    );

    Ok(Json(result))
}
