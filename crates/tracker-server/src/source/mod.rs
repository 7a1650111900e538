//! Upstream position and statistics providers

pub mod polymarket;

use async_trait::async_trait;
use tracker_core::{Position, TraderStats, TrackerResult, WalletAddress};

pub use polymarket::PolymarketClient;

/// Where a wallet's positions and statistics come from.
///
/// Each call is independent and made at most once per cache miss. Retries, if
/// any, belong to the implementation; failures surface as
/// [`tracker_core::TrackerError::Upstream`].
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Settled or exited positions
    async fn fetch_closed_positions(&self, address: &WalletAddress) -> TrackerResult<Vec<Position>>;

    /// Positions still subject to price movement
    async fn fetch_open_positions(&self, address: &WalletAddress) -> TrackerResult<Vec<Position>>;

    /// Provider-reported trader statistics
    async fn fetch_trader_stats(&self, address: &WalletAddress) -> TrackerResult<TraderStats>;
}
