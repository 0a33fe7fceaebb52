//! BalanceEngine — shared, concurrently readable handle to a simulation.
//!
//! Mutating operations take the write half of a `tokio::sync::RwLock` for
//! their whole read-compute-mutate-append sequence, so concurrent ticks
//! queue rather than interleave. Snapshots and suggestions take the read
//! half and only ever see fully applied ticks.

use std::sync::Arc;
use std::time::Duration;

use nurseflow_balance::{BalanceMetric, TransferCandidate};
use nurseflow_core::{Patient, Roster, WardConfig};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::simulation::{HistoryEntry, ResetMode, Simulation, SimulationSettings, Snapshot, TickOutcome};

/// Cloneable handle to one simulation. No process-wide state: every
/// caller that needs the engine is handed a clone.
#[derive(Clone)]
pub struct BalanceEngine {
    sim: Arc<RwLock<Simulation>>,
}

impl BalanceEngine {
    /// Wrap an initialised simulation.
    pub fn new(sim: Simulation) -> Self {
        Self {
            sim: Arc::new(RwLock::new(sim)),
        }
    }

    /// Build an engine from a parsed `ward.toml`.
    pub fn from_config(config: &WardConfig) -> EngineResult<Self> {
        let roster = config
            .roster()
            .map_err(|e| EngineError::InvalidAssignment(e.to_string()))?;
        let settings = SimulationSettings {
            thresholds: config.thresholds,
            qualification_policy: config.engine.qualification_policy,
        };
        Ok(Self::new(Simulation::init(roster, settings)?))
    }

    /// Replace the simulation with a new roster, keeping the current settings.
    ///
    /// The existing state is left untouched if the roster is rejected.
    pub async fn init(&self, roster: Roster) -> EngineResult<Option<BalanceMetric>> {
        let mut sim = self.sim.write().await;
        let fresh = Simulation::init(roster, *sim.settings())?;
        *sim = fresh;
        Ok(sim.snapshot().metrics)
    }

    pub async fn tick(&self) -> EngineResult<TickOutcome> {
        self.sim.write().await.tick()
    }

    pub async fn run_until_converged(&self, max_ticks: u64) -> EngineResult<Vec<TickOutcome>> {
        self.sim.write().await.run_until_converged(max_ticks)
    }

    pub async fn reset(&self, mode: ResetMode) -> EngineResult<Option<BalanceMetric>> {
        self.sim.write().await.reset(mode)
    }

    pub async fn admit(&self, patient: Patient, nurse_id: &str) -> EngineResult<()> {
        self.sim.write().await.admit(patient, nurse_id)
    }

    pub async fn discharge(&self, patient_id: &str) -> EngineResult<Patient> {
        self.sim.write().await.discharge(patient_id)
    }

    pub async fn force_transfer(&self, patient_id: &str, to_nurse: &str) -> EngineResult<()> {
        self.sim.write().await.force_transfer(patient_id, to_nurse)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.sim.read().await.snapshot()
    }

    /// Current metrics and per-nurse counts, read under one lock.
    pub async fn metrics(&self) -> EngineResult<(BalanceMetric, Vec<u32>)> {
        let sim = self.sim.read().await;
        Ok((sim.metrics()?, sim.counts()))
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.sim.read().await.history().to_vec()
    }

    pub async fn suggest_transfers(&self, k: usize) -> EngineResult<Vec<TransferCandidate>> {
        self.sim.read().await.suggest_transfers(k)
    }

    /// Metrics and the top `k` candidates, read under one lock so both
    /// describe the same state.
    pub async fn advice_inputs(&self, k: usize) -> EngineResult<(BalanceMetric, Vec<TransferCandidate>)> {
        let sim = self.sim.read().await;
        let candidates = sim.suggest_transfers(k)?;
        Ok((sim.metrics()?, candidates))
    }

    /// Run the auto-tick loop until `shutdown` flips.
    pub async fn run(&self, interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(interval_ms = interval.as_millis() as u64, "auto-tick loop started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match self.tick().await {
                        Ok(outcome) if outcome.converged => {
                            debug!(tick = outcome.tick, "auto-tick at fixpoint");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "auto-tick failed");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("auto-tick loop shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nurseflow_core::{Acuity, BalanceStatus};

    fn engine() -> BalanceEngine {
        BalanceEngine::from_config(&WardConfig::scaffold()).unwrap()
    }

    #[tokio::test]
    async fn from_config_loads_scaffold() {
        let engine = engine();
        let snap = engine.snapshot().await;
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.counts, vec![7, 4, 4, 4, 3, 2, 2, 1, 0, 0]);
        assert_eq!(snap.metrics.unwrap().status, BalanceStatus::Inadequate);
    }

    #[tokio::test]
    async fn from_config_rejects_bad_assignment() {
        let mut config = WardConfig::scaffold();
        config.patients[0].nurse = "ghost".to_string();
        assert!(matches!(
            BalanceEngine::from_config(&config),
            Err(EngineError::InvalidAssignment(_))
        ));
    }

    #[tokio::test]
    async fn tick_through_handle() {
        let engine = engine();
        let outcome = engine.tick().await.unwrap();
        assert_eq!(outcome.tick, 1);
        let (metrics, counts) = engine.metrics().await.unwrap();
        assert_eq!(counts, vec![6, 4, 4, 4, 3, 2, 2, 1, 1, 0]);
        assert_eq!(metrics, outcome.metrics);
    }

    #[tokio::test]
    async fn concurrent_ticks_are_serialized() {
        let engine = engine();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move { engine.tick().await.unwrap() }));
        }
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                let snap = engine.snapshot().await;
                assert_eq!(snap.counts.iter().sum::<u32>(), 27);
                assert_eq!(snap.history.len() as u64, snap.tick);
                engine.tick().await.unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let history = engine.history().await;
        assert_eq!(history.len(), 24);
        for (i, entry) in history.iter().enumerate() {
            assert_eq!(entry.tick, i as u64);
            assert_eq!(entry.counts.iter().sum::<u32>(), 27);
        }
    }

    #[tokio::test]
    async fn init_replaces_state_and_keeps_old_on_error() {
        let engine = engine();
        engine.tick().await.unwrap();

        let mut bad = WardConfig::scaffold().roster().unwrap();
        bad.assignment.clear();
        assert!(engine.init(bad).await.is_err());
        assert_eq!(engine.snapshot().await.tick, 1);

        let roster = WardConfig::scaffold().roster().unwrap();
        let metrics = engine.init(roster).await.unwrap().unwrap();
        assert_eq!(metrics.max, 7);
        assert_eq!(engine.snapshot().await.tick, 0);
    }

    #[tokio::test]
    async fn advice_inputs_are_consistent() {
        let engine = engine();
        let (metrics, candidates) = engine.advice_inputs(2).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].projected_std_dev < metrics.std_dev);
        assert!(matches!(
            engine.advice_inputs(0).await,
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn commands_through_handle() {
        let engine = engine();
        engine
            .admit(Patient::new("p99", Acuity::saturating(2), "med-surg"), "n10")
            .await
            .unwrap();
        engine.force_transfer("p01", "n09").await.unwrap();
        engine.discharge("p02").await.unwrap();

        let snap = engine.snapshot().await;
        assert_eq!(snap.counts, vec![5, 4, 4, 4, 3, 2, 2, 1, 1, 1]);
        assert_eq!(snap.admitted, 27);

        engine.reset(ResetMode::Original).await.unwrap();
        assert_eq!(engine.snapshot().await.counts, vec![7, 4, 4, 4, 3, 2, 2, 1, 0, 0]);
    }

    #[tokio::test]
    async fn run_loop_ticks_until_shutdown() {
        let engine = engine();
        let (tx, rx) = tokio::sync::watch::channel(false);
        let runner = engine.clone();
        let handle = tokio::spawn(async move {
            runner.run(Duration::from_millis(5), rx).await;
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        let snap = engine.snapshot().await;
        assert!(snap.tick > 0);
        assert!(snap.metrics.unwrap().std_dev < 2.05);
    }
}
