//! Transfer candidate generation — greedy single-patient moves.
//!
//! Given the current assignment, the generator:
//! 1. Splits nurses into overloaded (count > mean) and underutilized
//!    (count < mean); nurses exactly at the mean are neither
//! 2. Pairs every patient of an overloaded nurse with every eligible
//!    underutilized nurse
//! 3. Scores each pair by re-running the metrics on hypothetically moved
//!    counts and keeps only moves that strictly lower the std-dev
//!
//! Nothing here explores multi-move sequences.

use std::cmp::Ordering;
use std::collections::HashMap;

use nurseflow_core::{Acuity, Assignment, BalanceThresholds, Nurse, NurseId, Patient, PatientId, QualificationPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BalanceResult;
use crate::metrics::compute_with;

/// Benefits are compared at this resolution so rounding noise between
/// equivalent moves never reorders them or counts as an improvement.
const BENEFIT_RESOLUTION: f64 = 1e-9;

/// A hypothetical reassignment of one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCandidate {
    pub patient_id: PatientId,
    pub acuity: Acuity,
    pub from_nurse: NurseId,
    pub to_nurse: NurseId,
    /// Whether `to_nurse` holds the patient's required-unit tag.
    pub qualification_match: bool,
    /// Source nurse's count before the move.
    pub source_count: u32,
    pub projected_std_dev: f64,
    /// `current std-dev - projected std-dev`, always positive.
    pub benefit: f64,
}

/// Count patients per nurse, in roster order.
///
/// Assignment entries naming an unknown nurse are ignored.
pub fn per_nurse_counts(nurses: &[Nurse], assignment: &Assignment) -> Vec<u32> {
    let index = nurse_index(nurses);
    let mut counts = vec![0u32; nurses.len()];
    for nurse_id in assignment.values() {
        if let Some(&idx) = index.get(nurse_id.as_str()) {
            counts[idx] += 1;
        }
    }
    counts
}

/// Enumerate and rank every strictly improving single-patient transfer.
///
/// `patients` is borrowed, so callers can pass a slice or the values of
/// whatever map they keep patients in.
///
/// Under [`QualificationPolicy::Strict`] only qualified destinations are
/// considered. Under `Advisory` unqualified ones are listed too, flagged
/// with `qualification_match = false` and ranked after qualified moves of
/// equal benefit.
pub fn rank_transfers<'a>(
    nurses: &[Nurse],
    patients: impl IntoIterator<Item = &'a Patient>,
    assignment: &Assignment,
    thresholds: &BalanceThresholds,
    policy: QualificationPolicy,
) -> BalanceResult<Vec<TransferCandidate>> {
    let mut counts = per_nurse_counts(nurses, assignment);
    let current = compute_with(&counts, thresholds)?;
    let mean = current.mean;

    let index = nurse_index(nurses);
    let underutilized: Vec<usize> = (0..nurses.len())
        .filter(|&i| f64::from(counts[i]) < mean)
        .collect();

    let mut candidates = Vec::new();

    for patient in patients {
        let Some(from) = assignment
            .get(&patient.id)
            .and_then(|nurse_id| index.get(nurse_id.as_str()).copied())
        else {
            continue;
        };
        if f64::from(counts[from]) <= mean {
            continue;
        }

        for &to in &underutilized {
            let qualified = nurses[to].is_qualified_for(patient);
            if !qualified && policy == QualificationPolicy::Strict {
                continue;
            }

            let source_count = counts[from];
            counts[from] -= 1;
            counts[to] += 1;
            let projected = compute_with(&counts, thresholds);
            counts[from] += 1;
            counts[to] -= 1;
            let projected = projected?;

            let benefit = current.std_dev - projected.std_dev;
            if quantize(benefit) <= 0 {
                continue;
            }

            candidates.push(TransferCandidate {
                patient_id: patient.id.clone(),
                acuity: patient.acuity,
                from_nurse: nurses[from].id.clone(),
                to_nurse: nurses[to].id.clone(),
                qualification_match: qualified,
                source_count,
                projected_std_dev: projected.std_dev,
                benefit,
            });
        }
    }

    candidates.sort_by(rank_order);

    debug!(
        candidates = candidates.len(),
        std_dev = current.std_dev,
        mean,
        "ranked transfer candidates"
    );

    Ok(candidates)
}

/// Best first: benefit, then qualified, then busier source, then lowest
/// patient id, then lowest destination id.
fn rank_order(a: &TransferCandidate, b: &TransferCandidate) -> Ordering {
    quantize(b.benefit)
        .cmp(&quantize(a.benefit))
        .then_with(|| b.qualification_match.cmp(&a.qualification_match))
        .then_with(|| b.source_count.cmp(&a.source_count))
        .then_with(|| a.patient_id.cmp(&b.patient_id))
        .then_with(|| a.to_nurse.cmp(&b.to_nurse))
}

fn quantize(benefit: f64) -> i64 {
    (benefit / BENEFIT_RESOLUTION).round() as i64
}

fn nurse_index(nurses: &[Nurse]) -> HashMap<&str, usize> {
    nurses
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect()
}
