//! Round-robin seeding of a fresh assignment.
//!
//! Used by [`ResetMode::Regenerate`](crate::ResetMode): every patient is
//! dealt, in id order, to the next qualified nurse for its required unit.
//! Each unit tag keeps its own cursor so wards with mixed specialities
//! still spread evenly within each speciality.

use std::collections::HashMap;

use nurseflow_core::{Assignment, Nurse, Patient};

use crate::error::{EngineError, EngineResult};

/// Per-unit cursor over the qualified nurses for that unit.
#[derive(Debug, Default)]
struct UnitCursor {
    dealt: usize,
}

impl UnitCursor {
    /// Index of the nurse receiving the next patient, or `None` when the
    /// unit has no qualified nurse.
    fn next_index(&mut self, qualified: usize) -> Option<usize> {
        if qualified == 0 {
            return None;
        }
        let idx = self.dealt % qualified;
        self.dealt += 1;
        Some(idx)
    }
}

/// Deal `patients` across their qualified `nurses` in roster order.
///
/// Fails with `InvalidAssignment` when some patient has no qualified nurse.
pub fn round_robin_assignment(nurses: &[Nurse], patients: &[Patient]) -> EngineResult<Assignment> {
    let mut ordered: Vec<&Patient> = patients.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut cursors: HashMap<&str, UnitCursor> = HashMap::new();
    let mut assignment = Assignment::new();

    for patient in ordered {
        let qualified: Vec<&Nurse> = nurses.iter().filter(|n| n.is_qualified_for(patient)).collect();
        let idx = cursors
            .entry(patient.required_unit.as_str())
            .or_default()
            .next_index(qualified.len())
            .ok_or_else(|| {
                EngineError::InvalidAssignment(format!(
                    "no nurse qualified for patient {} (requires {})",
                    patient.id, patient.required_unit
                ))
            })?;
        assignment.insert(patient.id.clone(), qualified[idx].id.clone());
    }

    Ok(assignment)
}
