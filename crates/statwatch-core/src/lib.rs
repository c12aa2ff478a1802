//! statwatch-core — shared library for the statwatch poller.
//!
//! Provides:
//! - `collector` — fetching the `_stats` payload (HTTP or mock) and parsing it
//! - `model` — the statistics record and its validation
//! - `analysis` — threshold rules producing warnings
//! - `config` — poller configuration and defaults
//! - `poller` — the poll loop and its failure policy
//! - `fmt` — formatting helpers for log lines

pub mod analysis;
pub mod collector;
pub mod config;
pub mod fmt;
pub mod model;
pub mod poller;

pub use config::{PollerConfig, Thresholds};
pub use model::StatsRecord;
pub use poller::{CycleError, CycleOutcome, PollState, Poller, RunSummary, StopReason};
