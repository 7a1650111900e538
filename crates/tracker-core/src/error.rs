//! Error types for Tracker Core

use thiserror::Error;

/// Domain failures. Cloneable so a single failed load can be handed to every
/// caller that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Compute error: {0}")]
    Compute(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
