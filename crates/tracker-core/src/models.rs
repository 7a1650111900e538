//! Domain models for trader tracking
//!
//! A trader is identified by an EVM wallet address. Everything else here is
//! either a position the wallet holds (or held), or a value derived from those
//! positions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

// =============================================================================
// Wallet Address
// =============================================================================

const ADDRESS_HEX_LEN: usize = 40;

/// A `0x`-prefixed, 40-hex-character EVM wallet address.
///
/// Addresses are case-insensitive, so the parsed form is always lowercase.
/// Two inputs differing only in letter case produce equal values and hash to
/// the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(input: &str) -> TrackerResult<Self> {
        let hex = input
            .strip_prefix("0x")
            .ok_or_else(|| TrackerError::InvalidAddress(input.to_string()))?;

        if hex.len() != ADDRESS_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TrackerError::InvalidAddress(input.to_string()));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for WalletAddress {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(address: WalletAddress) -> Self {
        address.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Positions
// =============================================================================

/// Direction of a position's exposure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    /// Profits when the mark price rises. Outcome shares are always long.
    #[default]
    Long,
    /// Profits when the mark price falls
    Short,
}

impl PositionSide {
    pub fn sign(&self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// One market exposure held, or formerly held, by a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Market identifier (condition id on Polymarket)
    pub market_id: String,

    /// Market title/question, when the provider supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Outcome held (e.g. "Yes", "No", or a named outcome)
    pub outcome: String,

    pub side: PositionSide,

    /// Number of outcome shares
    pub size: f64,

    /// Average entry price per share
    pub entry_price: f64,

    /// Current price while open, exit price once closed
    pub mark_price: f64,

    /// Realized P&L as reported by the provider. Takes precedence over the
    /// mark-price figure so small amounts are not lost to rounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<f64>,

    pub status: PositionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Position {
    /// Capital put into the position at entry
    pub fn entry_notional(&self) -> f64 {
        self.size * self.entry_price
    }

    /// Value of the position at the mark (current or exit) price
    pub fn mark_value(&self) -> f64 {
        self.size * self.mark_price
    }

    /// Profit or loss: the reported realized figure when there is one,
    /// otherwise the mark-price difference signed by side
    pub fn pnl(&self) -> f64 {
        match self.realized_pnl {
            Some(realized) => realized,
            None => (self.mark_value() - self.entry_notional()) * self.side.sign(),
        }
    }
}

// =============================================================================
// Derived Values
// =============================================================================

/// Aggregate performance over a wallet's open and closed positions.
///
/// Never stored authoritatively: it can be recomputed at any time from the
/// underlying position sets, and a new summary always replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub total_volume: f64,
    /// Fraction of decided closed positions that were profitable (0.0 - 1.0)
    pub win_rate: f64,
    pub roi: f64,
    pub wins: u32,
    pub losses: u32,
    pub open_positions: u32,
    pub closed_positions: u32,
}

/// A computed summary, stamped with when it was computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderPerformance {
    pub address: WalletAddress,
    pub performance: PerformanceSummary,
    pub last_updated: DateTime<Utc>,
}

/// Raw position lists for a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderPositions {
    pub address: WalletAddress,
    pub open: Vec<Position>,
    pub closed: Vec<Position>,
    pub last_updated: DateTime<Utc>,
}

/// Leaderboard statistics as reported by the provider, passed through as-is.
///
/// Every field is optional: wallets that never traded, or never ranked, come
/// back empty rather than as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderStats {
    pub rank: Option<i64>,
    pub user_name: Option<String>,
    pub volume: Option<f64>,
    pub pnl: Option<f64>,
    pub profile_image: Option<String>,
    pub x_username: Option<String>,
    pub verified_badge: Option<bool>,
}

/// Trader statistics for one wallet, stamped with when they were fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderProfile {
    pub address: WalletAddress,
    #[serde(flatten)]
    pub stats: TraderStats,
    pub last_updated: DateTime<Utc>,
}
