//! Balance metrics over per-nurse patient counts.
//!
//! Uses the population variance (divisor `N`, not `N - 1`). Every other
//! component that needs to know "how balanced is the ward" goes through
//! [`compute_with`], including the transfer ranking when it scores
//! hypothetical moves.

use nurseflow_core::{BalanceStatus, BalanceThresholds};
use serde::{Deserialize, Serialize};

use crate::error::{BalanceError, BalanceResult};

/// Balance of a single count distribution. Always recomputed, never patched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceMetric {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub max: u32,
    pub status: BalanceStatus,
}

/// Compute metrics with the default thresholds.
pub fn compute(counts: &[u32]) -> BalanceResult<BalanceMetric> {
    compute_with(counts, &BalanceThresholds::default())
}

/// Compute metrics for `counts`, classifying against `thresholds`.
pub fn compute_with(counts: &[u32], thresholds: &BalanceThresholds) -> BalanceResult<BalanceMetric> {
    if counts.is_empty() {
        return Err(BalanceError::EmptyPopulation);
    }

    let n = counts.len() as f64;
    let sum: u64 = counts.iter().map(|&c| u64::from(c)).sum();
    let mean = sum as f64 / n;
    let variance = counts
        .iter()
        .map(|&c| {
            let d = f64::from(c) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    let max = counts.iter().copied().max().unwrap_or(0);

    Ok(BalanceMetric {
        mean,
        variance,
        std_dev,
        max,
        status: classify(max, std_dev, thresholds),
    })
}

/// Classify a distribution. IDEAL is tested before SUFFICIENT.
pub fn classify(max: u32, std_dev: f64, thresholds: &BalanceThresholds) -> BalanceStatus {
    if max <= thresholds.ideal_max && std_dev <= thresholds.ideal_std_dev {
        BalanceStatus::Ideal
    } else if max <= thresholds.sufficient_max && std_dev <= thresholds.sufficient_std_dev {
        BalanceStatus::Sufficient
    } else {
        BalanceStatus::Inadequate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn empty_population_is_rejected() {
        assert_eq!(compute(&[]), Err(BalanceError::EmptyPopulation));
    }

    #[test]
    fn inadequate_reference_distribution() {
        let m = compute(&[7, 4, 4, 4, 3, 2, 2, 1, 0, 0]).unwrap();
        assert!((m.mean - 2.7).abs() < TOL);
        assert!((m.variance - 4.21).abs() < 1e-9);
        assert!((m.std_dev - 2.05).abs() < 0.01, "std_dev = {}", m.std_dev);
        assert_eq!(m.max, 7);
        assert_eq!(m.status, BalanceStatus::Inadequate);
    }

    #[test]
    fn ideal_reference_distribution() {
        let m = compute(&[2, 2, 2, 1, 1, 1, 1, 1, 1, 1]).unwrap();
        assert!((m.mean - 1.3).abs() < TOL);
        assert!((m.std_dev - 0.46).abs() < 0.01, "std_dev = {}", m.std_dev);
        assert_eq!(m.max, 2);
        assert_eq!(m.status, BalanceStatus::Ideal);
    }

    #[test]
    fn sufficient_reference_distribution() {
        let m = compute(&[4, 4, 3, 3, 3, 2, 2, 2, 1, 1]).unwrap();
        assert!((m.mean - 2.5).abs() < TOL);
        assert_eq!(m.max, 4);
        assert_eq!(m.status, BalanceStatus::Sufficient);
    }

    #[test]
    fn uses_population_variance() {
        // Sample variance of [0, 2] would be 2.0.
        let m = compute(&[0, 2]).unwrap();
        assert!((m.variance - 1.0).abs() < TOL);
        assert!((m.std_dev - 1.0).abs() < TOL);
    }

    #[test]
    fn std_dev_is_sqrt_of_variance() {
        let samples: [&[u32]; 6] = [
            &[0],
            &[5],
            &[1, 1, 1, 1],
            &[0, 9],
            &[3, 1, 4, 1, 5, 9, 2, 6],
            &[12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        for counts in samples {
            let m = compute(counts).unwrap();
            assert!(m.variance >= 0.0);
            assert!((m.std_dev - m.variance.sqrt()).abs() < TOL);
        }
    }

    #[test]
    fn single_nurse_is_perfectly_balanced_in_spread() {
        let m = compute(&[6]).unwrap();
        assert_eq!(m.std_dev, 0.0);
        // Spread is zero but the load is still too high for IDEAL/SUFFICIENT.
        assert_eq!(m.status, BalanceStatus::Inadequate);
    }

    #[test]
    fn classify_checks_ideal_first() {
        let t = BalanceThresholds::default();
        assert_eq!(classify(2, 1.0, &t), BalanceStatus::Ideal);
        assert_eq!(classify(2, 1.2, &t), BalanceStatus::Sufficient);
        assert_eq!(classify(3, 0.1, &t), BalanceStatus::Sufficient);
        assert_eq!(classify(4, 1.5, &t), BalanceStatus::Sufficient);
        assert_eq!(classify(5, 0.0, &t), BalanceStatus::Inadequate);
        assert_eq!(classify(1, 1.6, &t), BalanceStatus::Inadequate);
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let t = BalanceThresholds {
            ideal_max: 3,
            ..BalanceThresholds::default()
        };
        let m = compute_with(&[3, 3, 2], &t).unwrap();
        assert_eq!(m.status, BalanceStatus::Ideal);
        assert_eq!(compute(&[3, 3, 2]).unwrap().status, BalanceStatus::Sufficient);
    }

    #[test]
    fn serializes_status_in_caps() {
        let m = compute(&[1, 1]).unwrap();
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["status"], "IDEAL");
        assert_eq!(json["max"], 1);
        assert_eq!(json["variance"], 0.0);
    }
}
