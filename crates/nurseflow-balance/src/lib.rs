//! nurseflow-balance — workload balance metrics and transfer ranking.
//!
//! Pure functions over per-nurse patient counts. Nothing here owns or
//! mutates simulation state; the engine crate does that.
//!
//! # Components
//!
//! - **`metrics`** — population mean/variance/std-dev and status classification
//! - **`candidates`** — greedy single-patient transfer enumeration and ranking

pub mod candidates;
pub mod error;
pub mod metrics;

pub use candidates::{TransferCandidate, per_nurse_counts, rank_transfers};
pub use error::{BalanceError, BalanceResult};
pub use metrics::{BalanceMetric, classify, compute, compute_with};
