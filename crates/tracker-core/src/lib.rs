//! # Tracker Core
//!
//! Domain models and the performance calculator for prediction-market trader
//! tracking.
//!
//! This crate is transport-agnostic: it knows what a wallet, a position and a
//! performance summary are, and how to reduce positions into a summary. Fetching
//! and caching live in `tracker-server`.

pub mod error;
pub mod models;
pub mod performance;

pub use error::*;
pub use models::*;
pub use performance::*;
