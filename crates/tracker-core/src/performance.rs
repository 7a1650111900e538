//! Performance calculation
//!
//! Reduces a wallet's closed and open positions into a [`PerformanceSummary`].
//! Pure and deterministic: the same position sets always produce the same
//! summary, which is what makes caching and duplicate concurrent computation safe.

use crate::error::{TrackerError, TrackerResult};
use crate::models::{PerformanceSummary, Position};

/// Compute realized/unrealized P&L, volume, win rate and ROI.
///
/// A closed position with exactly zero P&L is neither a win nor a loss.
/// `win_rate` and `roi` are 0 when their denominators are 0. Any other
/// non-finite result is a [`TrackerError::Compute`].
pub fn compute_performance(
    closed: &[Position],
    open: &[Position],
) -> TrackerResult<PerformanceSummary> {
    let mut summary = PerformanceSummary::default();

    for position in closed {
        let pnl = position.pnl();
        summary.realized_pnl += pnl;
        if pnl > 0.0 {
            summary.wins += 1;
        } else if pnl < 0.0 {
            summary.losses += 1;
        }
        summary.total_volume += position.entry_notional();
    }

    for position in open {
        summary.unrealized_pnl += position.pnl();
        summary.total_volume += position.entry_notional();
    }

    summary.closed_positions = count(closed.len());
    summary.open_positions = count(open.len());
    summary.total_pnl = summary.realized_pnl + summary.unrealized_pnl;

    let decided = summary.wins + summary.losses;
    summary.win_rate = if decided > 0 {
        f64::from(summary.wins) / f64::from(decided)
    } else {
        0.0
    };

    // Deployed capital is the entry notional of every position ever taken,
    // which is exactly the traded volume.
    let deployed = summary.total_volume;
    summary.roi = if deployed != 0.0 {
        summary.total_pnl / deployed
    } else {
        0.0
    };

    ensure_finite(&summary)?;
    Ok(summary)
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn ensure_finite(summary: &PerformanceSummary) -> TrackerResult<()> {
    let fields = [
        ("realized_pnl", summary.realized_pnl),
        ("unrealized_pnl", summary.unrealized_pnl),
        ("total_pnl", summary.total_pnl),
        ("total_volume", summary.total_volume),
        ("win_rate", summary.win_rate),
        ("roi", summary.roi),
    ];

    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(TrackerError::Compute(format!(
            "{} is not finite ({})",
            name, value
        ))),
        None => Ok(()),
    }
}
