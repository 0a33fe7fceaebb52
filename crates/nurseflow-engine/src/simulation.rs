//! Simulation state and the tick driver.
//!
//! `Simulation` is the single owner of the assignment relation. Every
//! mutation goes through one of its `&mut self` methods, so wrapping it in
//! a lock (see [`BalanceEngine`](crate::BalanceEngine)) is enough to make
//! each operation atomic with respect to readers.

use std::collections::{BTreeMap, HashSet};

use nurseflow_balance::{BalanceMetric, TransferCandidate, compute_with, per_nurse_counts, rank_transfers};
use nurseflow_core::{
    Assignment, BalanceStatus, BalanceThresholds, Nurse, NurseId, Patient, PatientId, QualificationPolicy, Roster,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::seeding::round_robin_assignment;

/// Tuning that survives `init` and `reset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub thresholds: BalanceThresholds,
    /// Applies to suggestions only; ticks always move within qualification.
    pub qualification_policy: QualificationPolicy,
}

/// One recorded tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Tick counter value when the tick started.
    pub tick: u64,
    /// Per-nurse counts after the tick, in roster order.
    pub counts: Vec<u32>,
    pub metrics: BalanceMetric,
}

/// Result of a single `tick()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Tick counter after the tick.
    pub tick: u64,
    pub metrics: BalanceMetric,
    pub transfer: Option<TransferCandidate>,
    /// True when nothing moved.
    pub converged: bool,
}

/// Per-nurse reporting row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurseLoad {
    pub nurse_id: NurseId,
    pub name: String,
    pub unit: String,
    pub patients: u32,
    pub acuity_total: u32,
    pub capacity: u32,
    /// `acuity_total / capacity * 100`; zero when capacity is zero.
    pub utilization_pct: f64,
}

/// Immutable view of a fully applied state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub counts: Vec<u32>,
    /// `None` only when the ward has no nurses.
    pub metrics: Option<BalanceMetric>,
    pub loads: Vec<NurseLoad>,
    pub admitted: usize,
    pub history: Vec<HistoryEntry>,
}

/// What `reset()` rebuilds the assignment from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// The roster and assignment given at `init`.
    #[default]
    Original,
    /// The `init` patients, dealt round-robin over qualified nurses.
    Regenerate,
}

/// Ward simulation: nurses, admitted patients, the assignment, and history.
#[derive(Debug, Clone)]
pub struct Simulation {
    settings: SimulationSettings,
    initial: Roster,
    nurses: Vec<Nurse>,
    patients: BTreeMap<PatientId, Patient>,
    assignment: Assignment,
    tick: u64,
    history: Vec<HistoryEntry>,
}

impl Simulation {
    /// Establish a simulation at tick 0.
    ///
    /// Rejects the roster with `InvalidAssignment` unless the assignment is
    /// a total function from the patients onto known, qualified nurses.
    pub fn init(roster: Roster, settings: SimulationSettings) -> EngineResult<Self> {
        validate_roster(&roster)?;

        let patients = roster
            .patients
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();

        let sim = Self {
            settings,
            nurses: roster.nurses.clone(),
            patients,
            assignment: roster.assignment.clone(),
            initial: roster,
            tick: 0,
            history: Vec::new(),
        };

        info!(
            nurses = sim.nurses.len(),
            patients = sim.patients.len(),
            "simulation initialised"
        );
        Ok(sim)
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn nurses(&self) -> &[Nurse] {
        &self.nurses
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn admitted(&self) -> usize {
        self.patients.len()
    }

    /// Per-nurse patient counts in roster order.
    pub fn counts(&self) -> Vec<u32> {
        per_nurse_counts(&self.nurses, &self.assignment)
    }

    /// Current metrics; `EmptyPopulation` when there are no nurses.
    pub fn metrics(&self) -> EngineResult<BalanceMetric> {
        Ok(compute_with(&self.counts(), &self.settings.thresholds)?)
    }

    /// Advance exactly one tick, applying at most one transfer.
    pub fn tick(&mut self) -> EngineResult<TickOutcome> {
        if self.nurses.is_empty() {
            return Err(EngineError::NoNurses);
        }

        let before = self.metrics()?;
        let transfer = if before.status == BalanceStatus::Ideal {
            None
        } else {
            self.ranked(QualificationPolicy::Strict)?.into_iter().next()
        };

        if let Some(candidate) = &transfer {
            self.assignment
                .insert(candidate.patient_id.clone(), candidate.to_nurse.clone());
            info!(
                tick = self.tick,
                patient = %candidate.patient_id,
                from = %candidate.from_nurse,
                to = %candidate.to_nurse,
                benefit = candidate.benefit,
                "transfer applied"
            );
        }

        let counts = self.counts();
        let metrics = compute_with(&counts, &self.settings.thresholds)?;
        self.history.push(HistoryEntry {
            tick: self.tick,
            counts,
            metrics,
        });
        self.tick += 1;

        debug!(
            tick = self.tick,
            std_dev = metrics.std_dev,
            status = %metrics.status,
            moved = transfer.is_some(),
            "tick complete"
        );

        Ok(TickOutcome {
            tick: self.tick,
            metrics,
            converged: transfer.is_none(),
            transfer,
        })
    }

    /// Tick until a tick applies nothing or `max_ticks` ticks have run.
    pub fn run_until_converged(&mut self, max_ticks: u64) -> EngineResult<Vec<TickOutcome>> {
        let mut outcomes = Vec::new();
        for _ in 0..max_ticks {
            let outcome = self.tick()?;
            let converged = outcome.converged;
            outcomes.push(outcome);
            if converged {
                break;
            }
        }
        Ok(outcomes)
    }

    /// Top `k` ranked candidates under the configured qualification policy.
    /// Read-only.
    pub fn suggest_transfers(&self, k: usize) -> EngineResult<Vec<TransferCandidate>> {
        if k == 0 {
            return Err(EngineError::InvalidArgument("k must be positive".to_string()));
        }
        let mut ranked = self.ranked(self.settings.qualification_policy)?;
        ranked.truncate(k);
        Ok(ranked)
    }

    /// Return to tick 0 with an empty history.
    pub fn reset(&mut self, mode: ResetMode) -> EngineResult<Option<BalanceMetric>> {
        let assignment = match mode {
            ResetMode::Original => self.initial.assignment.clone(),
            ResetMode::Regenerate => round_robin_assignment(&self.initial.nurses, &self.initial.patients)?,
        };

        self.nurses = self.initial.nurses.clone();
        self.patients = self
            .initial
            .patients
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        self.assignment = assignment;
        self.tick = 0;
        self.history.clear();

        info!(?mode, "simulation reset");
        self.optional_metrics()
    }

    /// Admit a new patient under `nurse_id`.
    pub fn admit(&mut self, patient: Patient, nurse_id: &str) -> EngineResult<()> {
        if self.patients.contains_key(&patient.id) {
            return Err(EngineError::DuplicatePatient(patient.id));
        }
        let nurse = self.nurse(nurse_id)?;
        ensure_qualified(nurse, &patient)?;

        info!(patient = %patient.id, nurse = %nurse_id, acuity = %patient.acuity, "patient admitted");
        self.assignment.insert(patient.id.clone(), nurse_id.to_string());
        self.patients.insert(patient.id.clone(), patient);
        Ok(())
    }

    /// Remove a patient from the ward.
    pub fn discharge(&mut self, patient_id: &str) -> EngineResult<Patient> {
        let patient = self
            .patients
            .remove(patient_id)
            .ok_or_else(|| EngineError::UnknownPatient(patient_id.to_string()))?;
        self.assignment.remove(patient_id);
        info!(patient = %patient_id, "patient discharged");
        Ok(patient)
    }

    /// Move a patient on request. Never bypasses qualification checks.
    pub fn force_transfer(&mut self, patient_id: &str, to_nurse: &str) -> EngineResult<()> {
        let patient = self
            .patients
            .get(patient_id)
            .ok_or_else(|| EngineError::UnknownPatient(patient_id.to_string()))?;
        let nurse = self.nurse(to_nurse)?;
        if let Err(e) = ensure_qualified(nurse, patient) {
            warn!(patient = %patient_id, nurse = %to_nurse, "rejected unqualified transfer");
            return Err(e);
        }

        let from = self
            .assignment
            .insert(patient_id.to_string(), to_nurse.to_string());
        info!(patient = %patient_id, from = ?from, to = %to_nurse, "manual transfer applied");
        Ok(())
    }

    /// Consistent view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let counts = self.counts();
        let metrics = compute_with(&counts, &self.settings.thresholds).ok();
        Snapshot {
            tick: self.tick,
            loads: self.loads(&counts),
            counts,
            metrics,
            admitted: self.patients.len(),
            history: self.history.clone(),
        }
    }

    fn loads(&self, counts: &[u32]) -> Vec<NurseLoad> {
        self.nurses
            .iter()
            .zip(counts)
            .map(|(nurse, &patients)| {
                let acuity_total: u32 = self
                    .assignment
                    .iter()
                    .filter(|(_, n)| **n == nurse.id)
                    .filter_map(|(p, _)| self.patients.get(p))
                    .map(|p| u32::from(p.acuity.level()))
                    .sum();
                let utilization_pct = if nurse.capacity > 0 {
                    f64::from(acuity_total) / f64::from(nurse.capacity) * 100.0
                } else {
                    0.0
                };
                NurseLoad {
                    nurse_id: nurse.id.clone(),
                    name: nurse.name.clone(),
                    unit: nurse.unit.clone(),
                    patients,
                    acuity_total,
                    capacity: nurse.capacity,
                    utilization_pct,
                }
            })
            .collect()
    }

    fn ranked(&self, policy: QualificationPolicy) -> EngineResult<Vec<TransferCandidate>> {
        Ok(rank_transfers(
            &self.nurses,
            self.patients.values(),
            &self.assignment,
            &self.settings.thresholds,
            policy,
        )?)
    }

    fn optional_metrics(&self) -> EngineResult<Option<BalanceMetric>> {
        if self.nurses.is_empty() {
            Ok(None)
        } else {
            self.metrics().map(Some)
        }
    }

    fn nurse(&self, nurse_id: &str) -> EngineResult<&Nurse> {
        self.nurses
            .iter()
            .find(|n| n.id == nurse_id)
            .ok_or_else(|| EngineError::UnknownNurse(nurse_id.to_string()))
    }
}

fn ensure_qualified(nurse: &Nurse, patient: &Patient) -> EngineResult<()> {
    if nurse.is_qualified_for(patient) {
        Ok(())
    } else {
        Err(EngineError::UnqualifiedTransfer {
            patient: patient.id.clone(),
            nurse: nurse.id.clone(),
            required_unit: patient.required_unit.clone(),
        })
    }
}

fn validate_roster(roster: &Roster) -> EngineResult<()> {
    let invalid = |msg: String| Err(EngineError::InvalidAssignment(msg));

    let mut nurse_ids = HashSet::new();
    for nurse in &roster.nurses {
        if !nurse_ids.insert(nurse.id.as_str()) {
            return invalid(format!("duplicate nurse id: {}", nurse.id));
        }
        if nurse.qualifications.is_empty() {
            return invalid(format!("nurse {} has no qualifications", nurse.id));
        }
    }

    let mut patient_ids = HashSet::new();
    for patient in &roster.patients {
        if !patient_ids.insert(patient.id.as_str()) {
            return invalid(format!("duplicate patient id: {}", patient.id));
        }
        let Some(nurse_id) = roster.assignment.get(&patient.id) else {
            return invalid(format!("patient {} is not assigned", patient.id));
        };
        let Some(nurse) = roster.nurses.iter().find(|n| n.id == *nurse_id) else {
            return invalid(format!("patient {} assigned to unknown nurse {}", patient.id, nurse_id));
        };
        if !nurse.is_qualified_for(patient) {
            return invalid(format!(
                "nurse {} is not qualified for patient {} (requires {})",
                nurse.id, patient.id, patient.required_unit
            ));
        }
    }

    if let Some(stray) = roster.assignment.keys().find(|id| !patient_ids.contains(id.as_str())) {
        return invalid(format!("assignment names unknown patient {stray}"));
    }

    Ok(())
}
