//! Trader lookups: validate, consult the cache, fetch and compute on a miss.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use tracker_core::{
    compute_performance, Position, TraderPerformance, TraderPositions, TraderProfile,
    TrackerResult, WalletAddress,
};

use crate::cache::TtlCache;
use crate::source::PositionSource;

/// Performance includes unrealized P&L at live prices, so it gets the tight bound.
pub const PERFORMANCE_TTL: Duration = Duration::from_secs(30);
pub const POSITIONS_TTL: Duration = Duration::from_secs(30);
pub const STATS_TTL: Duration = Duration::from_secs(120);

/// Time-to-live per cache. Fixed at build time; tests shorten them.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub performance: Duration,
    pub positions: Duration,
    pub stats: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            performance: PERFORMANCE_TTL,
            positions: POSITIONS_TTL,
            stats: STATS_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub performance: u64,
    pub positions: u64,
    pub stats: u64,
}

#[derive(Clone)]
pub struct TraderService {
    source: Arc<dyn PositionSource>,
    performance: TtlCache<WalletAddress, TraderPerformance>,
    positions: TtlCache<WalletAddress, TraderPositions>,
    stats: TtlCache<WalletAddress, TraderProfile>,
}

impl TraderService {
    pub fn new(source: Arc<dyn PositionSource>, ttls: CacheTtls, max_capacity: u64) -> Self {
        Self {
            source,
            performance: TtlCache::new(ttls.performance, max_capacity),
            positions: TtlCache::new(ttls.positions, max_capacity),
            stats: TtlCache::new(ttls.stats, max_capacity),
        }
    }

    /// Performance summary for a wallet, computed from its open and closed
    /// positions and cached per wallet.
    pub async fn get_performance(&self, address: &str) -> TrackerResult<TraderPerformance> {
        let address = WalletAddress::parse(address)?;

        if let Some(cached) = self.performance.get(&address).await {
            debug!(wallet = %address, "Performance cache hit");
            return Ok(cached);
        }
        debug!(wallet = %address, "Performance cache miss");

        let source = Arc::clone(&self.source);
        let key = address.clone();
        self.performance
            .get_or_try_insert_with(key, async move {
                let start = Instant::now();
                let (closed, open) = fetch_position_sets(source.as_ref(), &address).await?;
                let performance = compute_performance(&closed, &open)?;

                info!(
                    wallet = %address,
                    closed = closed.len(),
                    open = open.len(),
                    realized_pnl = performance.realized_pnl,
                    unrealized_pnl = performance.unrealized_pnl,
                    win_rate = performance.win_rate,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Performance computed"
                );

                Ok(TraderPerformance {
                    address,
                    performance,
                    last_updated: Utc::now(),
                })
            })
            .await
    }

    /// Raw open and closed positions for a wallet
    pub async fn get_positions(&self, address: &str) -> TrackerResult<TraderPositions> {
        let address = WalletAddress::parse(address)?;

        if let Some(cached) = self.positions.get(&address).await {
            debug!(wallet = %address, "Positions cache hit");
            return Ok(cached);
        }
        debug!(wallet = %address, "Positions cache miss");

        let source = Arc::clone(&self.source);
        let key = address.clone();
        self.positions
            .get_or_try_insert_with(key, async move {
                let (closed, open) = fetch_position_sets(source.as_ref(), &address).await?;

                Ok(TraderPositions {
                    address,
                    open,
                    closed,
                    last_updated: Utc::now(),
                })
            })
            .await
    }

    /// Provider-reported statistics for a wallet, without derived metrics
    pub async fn get_stats(&self, address: &str) -> TrackerResult<TraderProfile> {
        let address = WalletAddress::parse(address)?;

        if let Some(cached) = self.stats.get(&address).await {
            debug!(wallet = %address, "Stats cache hit");
            return Ok(cached);
        }
        debug!(wallet = %address, "Stats cache miss");

        let source = Arc::clone(&self.source);
        let key = address.clone();
        self.stats
            .get_or_try_insert_with(key, async move {
                let stats = source.fetch_trader_stats(&address).await.map_err(|e| {
                    warn!(wallet = %address, error = %e, "Trader stats fetch failed");
                    e
                })?;

                Ok(TraderProfile {
                    address,
                    stats,
                    last_updated: Utc::now(),
                })
            })
            .await
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            performance: self.performance.entry_count(),
            positions: self.positions.entry_count(),
            stats: self.stats.entry_count(),
        }
    }
}

/// Fetch closed and open positions concurrently. The first failure wins and
/// the other leg is dropped.
async fn fetch_position_sets(
    source: &dyn PositionSource,
    address: &WalletAddress,
) -> TrackerResult<(Vec<Position>, Vec<Position>)> {
    futures::try_join!(
        source.fetch_closed_positions(address),
        source.fetch_open_positions(address),
    )
    .map_err(|e| {
        warn!(wallet = %address, error = %e, "Position fetch failed");
        e
    })
}
