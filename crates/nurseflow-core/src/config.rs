//! ward.toml configuration parser.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Acuity, Assignment, BalanceThresholds, Nurse, Patient, QualificationPolicy, Roster};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub thresholds: BalanceThresholds,
    #[serde(default)]
    pub nurses: Vec<NurseConfig>,
    #[serde(default)]
    pub patients: Vec<PatientConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Auto-tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Default `k` for transfer suggestions.
    pub suggest_limit: usize,
    pub qualification_policy: QualificationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            suggest_limit: 5,
            qualification_policy: QualificationPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NurseConfig {
    pub id: String,
    pub name: String,
    pub unit: String,
    /// Defaults to the nurse's own unit when omitted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifications: Vec<String>,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientConfig {
    pub id: String,
    pub acuity: Acuity,
    pub required_unit: String,
    /// Initially assigned nurse id.
    pub nurse: String,
}

impl WardConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WardConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Split the configuration into nurses, patients, and the initial
    /// assignment. Assignment validity is checked by the engine at init;
    /// this only rejects structurally broken entries.
    pub fn roster(&self) -> CoreResult<Roster> {
        let mut seen = HashSet::new();
        let mut nurses = Vec::with_capacity(self.nurses.len());
        for entry in &self.nurses {
            if !seen.insert(entry.id.as_str()) {
                return Err(CoreError::Config(format!("duplicate nurse id: {}", entry.id)));
            }
            let qualifications: BTreeSet<String> = if entry.qualifications.is_empty() {
                BTreeSet::from([entry.unit.clone()])
            } else {
                entry.qualifications.iter().cloned().collect()
            };
            nurses.push(Nurse {
                id: entry.id.clone(),
                name: entry.name.clone(),
                unit: entry.unit.clone(),
                qualifications,
                capacity: entry.capacity,
            });
        }

        let mut patients = Vec::with_capacity(self.patients.len());
        let mut assignment = Assignment::new();
        for entry in &self.patients {
            if assignment.contains_key(&entry.id) {
                return Err(CoreError::Config(format!("duplicate patient id: {}", entry.id)));
            }
            patients.push(Patient::new(entry.id.clone(), entry.acuity, entry.required_unit.clone()));
            assignment.insert(entry.id.clone(), entry.nurse.clone());
        }

        Ok(Roster {
            nurses,
            patients,
            assignment,
        })
    }

    /// Demo ward: ten med-surg nurses whose starting loads are
    /// `[7, 4, 4, 4, 3, 2, 2, 1, 0, 0]`.
    pub fn scaffold() -> Self {
        const NAMES: [&str; 10] = [
            "Avery", "Blake", "Casey", "Devon", "Emery", "Finley", "Harper", "Jordan", "Kendall", "Logan",
        ];
        const LOADS: [usize; 10] = [7, 4, 4, 4, 3, 2, 2, 1, 0, 0];

        let nurses = NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut qualifications = vec!["med-surg".to_string()];
                if i % 2 == 0 {
                    qualifications.push("telemetry".to_string());
                }
                NurseConfig {
                    id: format!("n{:02}", i + 1),
                    name: (*name).to_string(),
                    unit: "med-surg".to_string(),
                    qualifications,
                    capacity: 20,
                }
            })
            .collect();

        let mut patients = Vec::new();
        for (nurse_idx, load) in LOADS.iter().enumerate() {
            for _ in 0..*load {
                let n = patients.len();
                patients.push(PatientConfig {
                    id: format!("p{:02}", n + 1),
                    acuity: Acuity::saturating((n * 3 % 5) as i64 + 1),
                    required_unit: "med-surg".to_string(),
                    nurse: format!("n{:02}", nurse_idx + 1),
                });
            }
        }

        WardConfig {
            engine: EngineConfig::default(),
            thresholds: BalanceThresholds::default(),
            nurses,
            patients,
        }
    }
}
