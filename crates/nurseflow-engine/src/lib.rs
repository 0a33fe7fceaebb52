//! nurseflow-engine — convergence engine for ward workload balancing.
//!
//! Owns the simulation state (nurses, patients, assignment, history) and
//! advances it one tick at a time. Each tick applies at most one transfer:
//!
//! ```text
//! metrics = compute(counts)
//!
//! if metrics.status == IDEAL:
//!     no-op (history still records the tick)
//! else:
//!     best = rank_transfers(state)[0]   // strict qualification
//!     if best exists: reassign best.patient -> best.to_nurse
//!
//! history.push((tick, counts, compute(counts)))
//! tick += 1
//! ```
//!
//! Once a tick applies nothing the engine sits at its fixpoint and further
//! ticks are no-ops.
//!
//! [`Simulation`] is the plain single-owner state machine. [`BalanceEngine`]
//! wraps it in a `tokio::sync::RwLock` so ticks are serialized while
//! snapshots and suggestions read concurrently.

pub mod engine;
pub mod error;
pub mod seeding;
pub mod simulation;

pub use engine::BalanceEngine;
pub use error::{EngineError, EngineResult};
pub use simulation::{
    HistoryEntry, NurseLoad, ResetMode, Simulation, SimulationSettings, Snapshot, TickOutcome,
};
