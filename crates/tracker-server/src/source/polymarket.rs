//! Polymarket Data API client
//!
//! Public endpoints, no authentication. Fetches open positions, closed
//! positions and leaderboard statistics for a wallet and normalizes them into
//! `tracker_core` types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use tracker_core::{
    Position, PositionSide, PositionStatus, TraderStats, TrackerError, TrackerResult,
    WalletAddress,
};

use super::PositionSource;
use crate::config::UpstreamConfig;

/// Per-page maximums the Data API accepts for each listing endpoint
const OPEN_PAGE_LIMIT: u32 = 500;
const CLOSED_PAGE_LIMIT: u32 = 50;
/// Upper bound on pages walked for one listing
const MAX_PAGES: u32 = 200;
const MAX_ERROR_BODY: usize = 200;

/// Polymarket Data API client
#[derive(Clone)]
pub struct PolymarketClient {
    client: Client,
    base_url: String,
}

// ---------------------------------------------------------------------------
// Deserialization structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenPositionRecord {
    asset: Option<String>,
    condition_id: Option<String>,
    title: Option<String>,
    outcome: Option<String>,
    size: Option<f64>,
    avg_price: Option<f64>,
    cur_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClosedPositionRecord {
    asset: Option<String>,
    condition_id: Option<String>,
    title: Option<String>,
    outcome: Option<String>,
    avg_price: Option<f64>,
    total_bought: Option<f64>,
    realized_pnl: Option<f64>,
    cur_price: Option<f64>,
    /// Unix seconds
    timestamp: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardEntry {
    rank: Option<i64>,
    user_name: Option<String>,
    vol: Option<f64>,
    pnl: Option<f64>,
    profile_image: Option<String>,
    x_username: Option<String>,
    verified_badge: Option<bool>,
}

/// The leaderboard endpoint has answered both with a bare array and with
/// `{ "leaderboard": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LeaderboardPayload {
    Bare(Vec<LeaderboardEntry>),
    Wrapped { leaderboard: Vec<LeaderboardEntry> },
}

impl LeaderboardPayload {
    fn into_entries(self) -> Vec<LeaderboardEntry> {
        match self {
            LeaderboardPayload::Bare(entries) => entries,
            LeaderboardPayload::Wrapped { leaderboard } => leaderboard,
        }
    }
}

fn market_id(condition_id: Option<String>, asset: Option<String>) -> String {
    condition_id.or(asset).unwrap_or_default()
}

impl From<OpenPositionRecord> for Position {
    fn from(record: OpenPositionRecord) -> Self {
        let entry_price = record.avg_price.unwrap_or(0.0);

        Position {
            market_id: market_id(record.condition_id, record.asset),
            title: record.title,
            outcome: record.outcome.unwrap_or_default(),
            side: PositionSide::Long,
            size: record.size.unwrap_or(0.0),
            entry_price,
            mark_price: record.cur_price.unwrap_or(entry_price),
            realized_pnl: None,
            status: PositionStatus::Open,
            opened_at: None,
            closed_at: None,
        }
    }
}

impl From<ClosedPositionRecord> for Position {
    fn from(record: ClosedPositionRecord) -> Self {
        let size = record.total_bought.unwrap_or(0.0);
        let entry_price = record.avg_price.unwrap_or(0.0);

        // Shares may have been sold before resolution, so the final market
        // price is not the exit price. Back the exit price out of the
        // provider's realized P&L for display; the P&L itself is carried as-is.
        let mark_price = match record.realized_pnl {
            Some(realized) if size > 0.0 => entry_price + realized / size,
            _ => record.cur_price.unwrap_or(entry_price),
        };

        Position {
            market_id: market_id(record.condition_id, record.asset),
            title: record.title,
            outcome: record.outcome.unwrap_or_default(),
            side: PositionSide::Long,
            size,
            entry_price,
            mark_price,
            realized_pnl: record.realized_pnl,
            status: PositionStatus::Closed,
            opened_at: None,
            closed_at: record
                .timestamp
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        }
    }
}

impl From<LeaderboardEntry> for TraderStats {
    fn from(entry: LeaderboardEntry) -> Self {
        TraderStats {
            rank: entry.rank,
            user_name: entry.user_name,
            volume: entry.vol,
            pnl: entry.pnl,
            profile_image: entry.profile_image,
            x_username: entry.x_username,
            verified_badge: entry.verified_badge,
        }
    }
}

// ---------------------------------------------------------------------------
// Client implementation
// ---------------------------------------------------------------------------

impl PolymarketClient {
    pub fn new(config: &UpstreamConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.data_api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, endpoint: &str) -> TrackerResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TrackerError::Upstream(format!("{} request failed: {}", endpoint, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(TrackerError::Upstream(format!(
                "{} returned status {}: {}",
                endpoint, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TrackerError::Upstream(format!("{} returned malformed payload: {}", endpoint, e)))
    }

    /// Walk a `limit`/`offset` listing until a short page comes back.
    ///
    /// `url` must already carry a query string. A listing that is still
    /// returning full pages after `MAX_PAGES` is an error rather than a
    /// silently truncated result.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &str,
        page_limit: u32,
    ) -> TrackerResult<Vec<T>> {
        let mut records = Vec::new();

        for page in 0..MAX_PAGES {
            let offset = page * page_limit;
            let page_url = format!("{}&limit={}&offset={}", url, page_limit, offset);

            let batch: Vec<T> = self.get_json(&page_url, endpoint).await?;
            let last_page = batch.len() < page_limit as usize;
            records.extend(batch);

            if last_page {
                return Ok(records);
            }
        }

        Err(TrackerError::Upstream(format!(
            "{} still returning full pages after {} requests",
            endpoint, MAX_PAGES
        )))
    }
}

#[async_trait]
impl PositionSource for PolymarketClient {
    /// GET /closed-positions?user={address}
    async fn fetch_closed_positions(&self, address: &WalletAddress) -> TrackerResult<Vec<Position>> {
        let url = format!("{}/closed-positions?user={}", self.base_url, address);
        debug!(wallet = %address, "Fetching closed positions");

        let records: Vec<ClosedPositionRecord> = self
            .get_all_pages(&url, "closed-positions", CLOSED_PAGE_LIMIT)
            .await?;
        debug!(wallet = %address, count = records.len(), "Closed positions fetched");
        Ok(records.into_iter().map(Position::from).collect())
    }

    /// GET /positions?user={address}
    async fn fetch_open_positions(&self, address: &WalletAddress) -> TrackerResult<Vec<Position>> {
        let url = format!("{}/positions?user={}&sizeThreshold=0", self.base_url, address);
        debug!(wallet = %address, "Fetching open positions");

        let records: Vec<OpenPositionRecord> = self
            .get_all_pages(&url, "positions", OPEN_PAGE_LIMIT)
            .await?;
        debug!(wallet = %address, count = records.len(), "Open positions fetched");
        Ok(records.into_iter().map(Position::from).collect())
    }

    /// GET /v1/leaderboard?user={address}
    async fn fetch_trader_stats(&self, address: &WalletAddress) -> TrackerResult<TraderStats> {
        let url = format!(
            "{}/v1/leaderboard?user={}&timePeriod=ALL&orderBy=PNL",
            self.base_url, address
        );
        debug!(wallet = %address, "Fetching trader stats");

        let payload: LeaderboardPayload = self.get_json(&url, "leaderboard").await?;
        Ok(payload
            .into_entries()
            .into_iter()
            .next()
            .map(TraderStats::from)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    const WALLET: &str = "0x2222222222222222222222222222222222222222";

    #[derive(Deserialize)]
    struct PageQuery {
        limit: usize,
        offset: usize,
    }

    #[derive(Clone, Default)]
    struct Listing {
        total: usize,
        offsets: Arc<Mutex<Vec<usize>>>,
    }

    async fn serve_page(State(listing): State<Listing>, Query(page): Query<PageQuery>) -> Json<Vec<Value>> {
        listing.offsets.lock().unwrap().push(page.offset);

        let records = (0..listing.total)
            .skip(page.offset)
            .take(page.limit)
            .map(|i| {
                json!({
                    "conditionId": format!("0x{:04x}", i),
                    "size": 10.0,
                    "totalBought": 10.0,
                    "avgPrice": 0.5,
                    "curPrice": 0.6,
                    "realizedPnl": 1.0
                })
            })
            .collect();

        Json(records)
    }

    /// Serve `total` records on both listing endpoints from a local port
    async fn stub_api(total: usize) -> (PolymarketClient, Listing, Listing) {
        let closed = Listing { total, ..Default::default() };
        let open = Listing { total, ..Default::default() };

        let router = Router::new()
            .route("/closed-positions", get(serve_page).with_state(closed.clone()))
            .route("/positions", get(serve_page).with_state(open.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        let client = PolymarketClient::new(&UpstreamConfig {
            data_api_url: format!("http://{}/", addr),
            timeout_seconds: 5,
        })
        .unwrap();

        (client, closed, open)
    }

    #[tokio::test]
    async fn test_closed_positions_walk_every_page() {
        let (client, closed, _) = stub_api(520).await;
        let wallet = WalletAddress::parse(WALLET).unwrap();

        let positions = client.fetch_closed_positions(&wallet).await.unwrap();

        assert_eq!(positions.len(), 520);
        assert_eq!(positions[519].market_id, "0x0207");
        let offsets = closed.offsets.lock().unwrap().clone();
        assert_eq!(offsets.len(), 11);
        assert_eq!(offsets.last(), Some(&500));
    }

    #[tokio::test]
    async fn test_open_positions_walk_every_page() {
        let (client, _, open) = stub_api(520).await;
        let wallet = WalletAddress::parse(WALLET).unwrap();

        let positions = client.fetch_open_positions(&wallet).await.unwrap();

        assert_eq!(positions.len(), 520);
        assert_eq!(*open.offsets.lock().unwrap(), vec![0, 500]);
    }

    #[tokio::test]
    async fn test_exact_page_multiple_ends_on_empty_page() {
        let (client, closed, _) = stub_api(100).await;
        let wallet = WalletAddress::parse(WALLET).unwrap();

        let positions = client.fetch_closed_positions(&wallet).await.unwrap();

        assert_eq!(positions.len(), 100);
        assert_eq!(*closed.offsets.lock().unwrap(), vec![0, 50, 100]);
    }

    #[tokio::test]
    async fn test_empty_wallet_is_one_request() {
        let (client, closed, _) = stub_api(0).await;
        let wallet = WalletAddress::parse(WALLET).unwrap();

        assert!(client.fetch_closed_positions(&wallet).await.unwrap().is_empty());
        assert_eq!(*closed.offsets.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_open_position_mapping() {
        let records: Vec<OpenPositionRecord> = serde_json::from_str(
            r#"[{
                "proxyWallet": "0x56687bf447db6ffa42ffe2204a05edaa20f55839",
                "asset": "1234",
                "conditionId": "0xabc",
                "size": 200.0,
                "avgPrice": 0.35,
                "curPrice": 0.5,
                "cashPnl": 30.0,
                "title": "Will it rain tomorrow?",
                "outcome": "Yes"
            }]"#,
        )
        .unwrap();

        let position = Position::from(records[0].clone());
        assert_eq!(position.market_id, "0xabc");
        assert_eq!(position.status, PositionStatus::Open);
        assert_eq!(position.outcome, "Yes");
        assert!((position.pnl() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_position_without_price_marks_at_entry() {
        let record: OpenPositionRecord =
            serde_json::from_str(r#"{"asset": "99", "size": 10.0, "avgPrice": 0.2}"#).unwrap();

        let position = Position::from(record);
        assert_eq!(position.market_id, "99");
        assert_eq!(position.pnl(), 0.0);
    }

    #[test]
    fn test_closed_position_reproduces_realized_pnl() {
        let record: ClosedPositionRecord = serde_json::from_str(
            r#"{
                "conditionId": "0xdef",
                "avgPrice": 0.4,
                "totalBought": 1000.0,
                "realizedPnl": -150.0,
                "curPrice": 0.0,
                "timestamp": 1718000000,
                "outcome": "No"
            }"#,
        )
        .unwrap();

        let position = Position::from(record);
        assert_eq!(position.status, PositionStatus::Closed);
        assert!((position.pnl() + 150.0).abs() < 1e-6);
        assert_eq!(position.closed_at.map(|t| t.timestamp()), Some(1718000000));
    }

    #[test]
    fn test_tiny_realized_pnl_survives_mapping() {
        let record: ClosedPositionRecord = serde_json::from_str(
            r#"{"conditionId": "0xdef", "avgPrice": 0.4, "totalBought": 1000000.0, "realizedPnl": 1e-12}"#,
        )
        .unwrap();

        let position = Position::from(record);
        assert_eq!(position.pnl(), 1e-12);

        let summary = tracker_core::compute_performance(&[position], &[]).unwrap();
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 0);
    }

    #[test]
    fn test_leaderboard_payload_shapes() {
        let bare: LeaderboardPayload =
            serde_json::from_str(r#"[{"rank": 3, "userName": "whale", "vol": 1500.5, "pnl": 220.0}]"#)
                .unwrap();
        let stats = TraderStats::from(bare.into_entries().remove(0));
        assert_eq!(stats.rank, Some(3));
        assert_eq!(stats.user_name.as_deref(), Some("whale"));
        assert_eq!(stats.volume, Some(1500.5));

        let wrapped: LeaderboardPayload =
            serde_json::from_str(r#"{"leaderboard": []}"#).unwrap();
        assert!(wrapped.into_entries().is_empty());
    }
}
