//! Recommendation layer.
//!
//! A [`RecommendationSource`] turns the engine's current metrics and its
//! ranked candidates into an actionable recommendation. Sources consume
//! the ranking verbatim; they never re-score or reorder transfers.
//!
//! [`RuleBasedAdvisor`] is the deterministic source used when no remote
//! generator is configured (or it is unavailable). Any other source must
//! return the same [`Recommendation`] shape.

use nurseflow_balance::{BalanceMetric, TransferCandidate};
use nurseflow_core::BalanceStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl From<BalanceStatus> for Priority {
    fn from(status: BalanceStatus) -> Self {
        match status {
            BalanceStatus::Inadequate => Priority::High,
            BalanceStatus::Sufficient => Priority::Medium,
            BalanceStatus::Ideal => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub status: BalanceStatus,
    pub current_std_dev: f64,
    /// Std-dev after the top transfer, or the current value if none.
    pub projected_std_dev: f64,
    /// Ranked transfers exactly as the engine produced them.
    pub transfers: Vec<TransferCandidate>,
    pub summary: String,
    /// Name of the source that produced this recommendation.
    pub source: String,
}

/// Something that can explain the engine's state.
pub trait RecommendationSource: Send + Sync {
    fn name(&self) -> &str;

    fn recommend(&self, metrics: &BalanceMetric, candidates: &[TransferCandidate]) -> Recommendation;
}

/// Deterministic fallback built from fixed rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

impl RecommendationSource for RuleBasedAdvisor {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn recommend(&self, metrics: &BalanceMetric, candidates: &[TransferCandidate]) -> Recommendation {
        let projected_std_dev = candidates
            .first()
            .map_or(metrics.std_dev, |c| c.projected_std_dev);

        let summary = match candidates.first() {
            Some(top) => format!(
                "Workload is {}: move patient {} (acuity {}) from {} to {} to cut std-dev {:.2} -> {:.2}{}.",
                metrics.status,
                top.patient_id,
                top.acuity,
                top.from_nurse,
                top.to_nurse,
                metrics.std_dev,
                top.projected_std_dev,
                if top.qualification_match { "" } else { " (destination lacks the required unit)" },
            ),
            None if metrics.status == BalanceStatus::Ideal => {
                format!("Workload is IDEAL (std-dev {:.2}); no transfer needed.", metrics.std_dev)
            }
            None => format!(
                "Workload is {} (std-dev {:.2}, max {}) but no single transfer improves it.",
                metrics.status, metrics.std_dev, metrics.max
            ),
        };

        Recommendation {
            priority: metrics.status.into(),
            status: metrics.status,
            current_std_dev: metrics.std_dev,
            projected_std_dev,
            transfers: candidates.to_vec(),
            summary,
            source: self.name().to_string(),
        }
    }
}
