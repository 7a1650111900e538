use serde::Serialize;

use crate::service::CacheStats;

// ============================================================================
// Health check
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cache: CacheEntries,
}

/// Live entry counts per cache. Caches grow with distinct wallets until the
/// capacity bound, so these are worth watching.
#[derive(Debug, Serialize)]
pub struct CacheEntries {
    pub performance: u64,
    pub positions: u64,
    pub stats: u64,
}

impl From<CacheStats> for CacheEntries {
    fn from(stats: CacheStats) -> Self {
        Self {
            performance: stats.performance,
            positions: stats.positions,
            stats: stats.stats,
        }
    }
}
