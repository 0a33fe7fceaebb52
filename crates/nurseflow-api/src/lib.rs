//! nurseflow-api — REST API for the balance engine.
//!
//! Thin axum routes over [`BalanceEngine`]. Handlers never compute
//! metrics or rankings themselves; they forward to the engine and wrap
//! the result in a `{ success, data, error }` envelope.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/snapshot` | Tick, counts, metrics, loads, history |
//! | GET | `/api/v1/metrics` | Current metrics + per-nurse counts |
//! | GET | `/api/v1/history` | Per-tick history |
//! | GET | `/api/v1/transfers?k=N` | Top-k ranked transfer candidates |
//! | POST | `/api/v1/transfers` | Force a single transfer |
//! | POST | `/api/v1/tick` | Advance one tick |
//! | POST | `/api/v1/reset` | Reset to tick 0 |
//! | POST | `/api/v1/init` | Replace the roster |
//! | POST | `/api/v1/patients` | Admit a patient |
//! | DELETE | `/api/v1/patients/:id` | Discharge a patient |
//! | GET | `/api/v1/recommendations?k=N` | Recommendation from the configured source |

pub mod advisor;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use nurseflow_engine::BalanceEngine;

use crate::advisor::{RecommendationSource, RuleBasedAdvisor};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub engine: BalanceEngine,
    /// `k` used when a request does not give one.
    pub suggest_limit: usize,
    pub advisor: Arc<dyn RecommendationSource>,
}

impl ApiState {
    pub fn new(engine: BalanceEngine) -> Self {
        Self {
            engine,
            suggest_limit: 5,
            advisor: Arc::new(RuleBasedAdvisor),
        }
    }

    pub fn with_suggest_limit(mut self, k: usize) -> Self {
        self.suggest_limit = k;
        self
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn RecommendationSource>) -> Self {
        self.advisor = advisor;
        self
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/snapshot", get(handlers::get_snapshot))
        .route("/metrics", get(handlers::get_metrics))
        .route("/history", get(handlers::get_history))
        .route("/transfers", get(handlers::suggest_transfers).post(handlers::force_transfer))
        .route("/tick", post(handlers::tick))
        .route("/reset", post(handlers::reset))
        .route("/init", post(handlers::init))
        .route("/patients", post(handlers::admit_patient))
        .route("/patients/{id}", delete(handlers::discharge_patient))
        .route("/recommendations", get(handlers::recommend))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
