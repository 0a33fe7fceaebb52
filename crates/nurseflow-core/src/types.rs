//! Shared types used across nurseflow crates.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Unique identifier for a patient.
pub type PatientId = String;

/// Unique identifier for a nurse.
pub type NurseId = String;

/// Patient → nurse mapping. Ordered so iteration is deterministic.
pub type Assignment = BTreeMap<PatientId, NurseId>;

// ── Acuity ─────────────────────────────────────────────────────────

/// Severity of a patient's care need, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Acuity(u8);

impl Acuity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: i64) -> CoreResult<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(CoreError::AcuityOutOfRange(level))
        }
    }

    /// Clamp an arbitrary level into range.
    pub fn saturating(level: i64) -> Self {
        Self(level.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Acuity {
    type Error = CoreError;

    fn try_from(level: i64) -> CoreResult<Self> {
        Self::new(level)
    }
}

impl From<Acuity> for u8 {
    fn from(acuity: Acuity) -> u8 {
        acuity.0
    }
}

impl fmt::Display for Acuity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Patient / Nurse ────────────────────────────────────────────────

/// An admitted patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub acuity: Acuity,
    /// Unit or skill tag a caring nurse must hold.
    pub required_unit: String,
}

impl Patient {
    pub fn new(id: impl Into<String>, acuity: Acuity, required_unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            acuity,
            required_unit: required_unit.into(),
        }
    }
}

/// A member of nursing staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nurse {
    pub id: NurseId,
    pub name: String,
    pub unit: String,
    /// Unit/skill tags this nurse is qualified for. Never empty.
    pub qualifications: BTreeSet<String>,
    /// Workload ceiling, used for utilisation reporting only.
    pub capacity: u32,
}

impl Nurse {
    /// Build a nurse qualified for their own unit only.
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit: impl Into<String>, capacity: u32) -> Self {
        let unit = unit.into();
        Self {
            id: id.into(),
            name: name.into(),
            qualifications: BTreeSet::from([unit.clone()]),
            unit,
            capacity,
        }
    }

    pub fn with_qualification(mut self, tag: impl Into<String>) -> Self {
        self.qualifications.insert(tag.into());
        self
    }

    /// Whether this nurse may care for the given patient.
    pub fn is_qualified_for(&self, patient: &Patient) -> bool {
        self.qualifications.contains(&patient.required_unit)
    }
}

/// Everything needed to initialise a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// Nurses in reporting order.
    pub nurses: Vec<Nurse>,
    pub patients: Vec<Patient>,
    pub assignment: Assignment,
}

// ── Balance tuning ─────────────────────────────────────────────────

/// Classification of how evenly patients are spread across nurses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceStatus {
    Ideal,
    Sufficient,
    Inadequate,
}

impl BalanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BalanceStatus::Ideal => "IDEAL",
            BalanceStatus::Sufficient => "SUFFICIENT",
            BalanceStatus::Inadequate => "INADEQUATE",
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bounds used to classify a [`BalanceStatus`]. IDEAL is checked first,
/// then SUFFICIENT; anything failing both is INADEQUATE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceThresholds {
    pub ideal_max: u32,
    pub ideal_std_dev: f64,
    pub sufficient_max: u32,
    pub sufficient_std_dev: f64,
}

impl Default for BalanceThresholds {
    fn default() -> Self {
        Self {
            ideal_max: 2,
            ideal_std_dev: 1.0,
            sufficient_max: 4,
            sufficient_std_dev: 1.5,
        }
    }
}

/// How the candidate generator treats destinations lacking the
/// patient's required-unit tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationPolicy {
    /// Only qualified destinations are enumerated.
    #[default]
    Strict,
    /// Unqualified destinations are also listed, flagged as non-matching.
    Advisory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acuity_accepts_range() {
        for level in 1..=5 {
            assert_eq!(Acuity::new(level).unwrap().level() as i64, level);
        }
    }

    #[test]
    fn acuity_rejects_out_of_range() {
        assert_eq!(Acuity::new(0), Err(CoreError::AcuityOutOfRange(0)));
        assert_eq!(Acuity::new(6), Err(CoreError::AcuityOutOfRange(6)));
        assert_eq!(Acuity::new(-3), Err(CoreError::AcuityOutOfRange(-3)));
        assert_eq!(Acuity::saturating(9).level(), 5);
        assert_eq!(Acuity::saturating(0).level(), 1);
    }

    #[test]
    fn acuity_deserialize_validates() {
        let ok: Acuity = serde_json::from_str("4").unwrap();
        assert_eq!(ok.level(), 4);
        assert!(serde_json::from_str::<Acuity>("9").is_err());
    }

    #[test]
    fn nurse_qualification_check() {
        let nurse = Nurse::new("n1", "Ada", "icu", 10).with_qualification("step-down");
        let icu = Patient::new("p1", Acuity::new(5).unwrap(), "icu");
        let step_down = Patient::new("p2", Acuity::new(3).unwrap(), "step-down");
        let peds = Patient::new("p3", Acuity::new(2).unwrap(), "peds");

        assert!(nurse.is_qualified_for(&icu));
        assert!(nurse.is_qualified_for(&step_down));
        assert!(!nurse.is_qualified_for(&peds));
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&BalanceStatus::Sufficient).unwrap();
        assert_eq!(json, "\"SUFFICIENT\"");
    }
}
