//! REST API handlers.
//!
//! Each handler forwards to the `BalanceEngine` and returns JSON responses.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nurseflow_core::{Patient, Roster};
use nurseflow_engine::{EngineError, ResetMode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn engine_error(e: EngineError) -> Response {
    let status = match &e {
        EngineError::InvalidArgument(_) | EngineError::InvalidAssignment(_) => StatusCode::BAD_REQUEST,
        EngineError::UnknownPatient(_) | EngineError::UnknownNurse(_) => StatusCode::NOT_FOUND,
        EngineError::UnqualifiedTransfer { .. } | EngineError::DuplicatePatient(_) => StatusCode::CONFLICT,
        EngineError::NoNurses | EngineError::Balance(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    debug!(error = %e, %status, "request rejected");
    error_response(&e.to_string(), status).into_response()
}

/// Optional `k` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub k: Option<i64>,
}

fn resolve_k(params: &LimitParams, default: usize) -> Result<usize, EngineError> {
    match params.k {
        None => Ok(default),
        Some(k) if k <= 0 => Err(EngineError::InvalidArgument(format!("k must be positive, got {k}"))),
        Some(k) => Ok(usize::try_from(k).unwrap_or(usize::MAX)),
    }
}

// ── Queries ────────────────────────────────────────────────────

/// GET /api/v1/snapshot
pub async fn get_snapshot(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.engine.snapshot().await)
}

/// GET /api/v1/metrics
pub async fn get_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    match state.engine.metrics().await {
        Ok((metrics, counts)) => ApiResponse::ok(serde_json::json!({
            "metrics": metrics,
            "counts": counts,
        }))
        .into_response(),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/history
pub async fn get_history(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.engine.history().await)
}

/// GET /api/v1/transfers?k=N
pub async fn suggest_transfers(
    State(state): State<ApiState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let k = match resolve_k(&params, state.suggest_limit) {
        Ok(k) => k,
        Err(e) => return engine_error(e),
    };
    match state.engine.suggest_transfers(k).await {
        Ok(candidates) => ApiResponse::ok(candidates).into_response(),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/recommendations?k=N
pub async fn recommend(
    State(state): State<ApiState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let k = match resolve_k(&params, state.suggest_limit) {
        Ok(k) => k,
        Err(e) => return engine_error(e),
    };
    match state.engine.advice_inputs(k).await {
        Ok((metrics, candidates)) => {
            ApiResponse::ok(state.advisor.recommend(&metrics, &candidates)).into_response()
        }
        Err(e) => engine_error(e),
    }
}

// ── Commands ───────────────────────────────────────────────────

/// POST /api/v1/tick
pub async fn tick(State(state): State<ApiState>) -> impl IntoResponse {
    match state.engine.tick().await {
        Ok(outcome) => ApiResponse::ok(outcome).into_response(),
        Err(e) => engine_error(e),
    }
}

/// Reset request body.
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub mode: ResetMode,
}

/// POST /api/v1/reset
pub async fn reset(
    State(state): State<ApiState>,
    Json(req): Json<ResetRequest>,
) -> impl IntoResponse {
    match state.engine.reset(req.mode).await {
        Ok(metrics) => ApiResponse::ok(serde_json::json!({
            "mode": req.mode,
            "metrics": metrics,
        }))
        .into_response(),
        Err(e) => engine_error(e),
    }
}

/// POST /api/v1/init
pub async fn init(
    State(state): State<ApiState>,
    Json(roster): Json<Roster>,
) -> impl IntoResponse {
    match state.engine.init(roster).await {
        Ok(metrics) => ApiResponse::ok(serde_json::json!({ "metrics": metrics })).into_response(),
        Err(e) => {
            warn!(error = %e, "roster rejected");
            engine_error(e)
        }
    }
}

/// Admit request body.
#[derive(Debug, Deserialize)]
pub struct AdmitRequest {
    pub patient: Patient,
    pub nurse_id: String,
}

/// POST /api/v1/patients
pub async fn admit_patient(
    State(state): State<ApiState>,
    Json(req): Json<AdmitRequest>,
) -> impl IntoResponse {
    let patient_id = req.patient.id.clone();
    match state.engine.admit(req.patient, &req.nurse_id).await {
        Ok(()) => (
            StatusCode::CREATED,
            ApiResponse::ok(serde_json::json!({
                "patient_id": patient_id,
                "nurse_id": req.nurse_id,
            })),
        )
            .into_response(),
        Err(e) => engine_error(e),
    }
}

/// DELETE /api/v1/patients/:id
pub async fn discharge_patient(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.engine.discharge(&id).await {
        Ok(patient) => ApiResponse::ok(patient).into_response(),
        Err(e) => engine_error(e),
    }
}

/// Manual transfer request body.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub patient_id: String,
    pub to_nurse: String,
}

/// POST /api/v1/transfers
pub async fn force_transfer(
    State(state): State<ApiState>,
    Json(req): Json<TransferRequest>,
) -> impl IntoResponse {
    match state.engine.force_transfer(&req.patient_id, &req.to_nurse).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({
            "patient_id": req.patient_id,
            "to_nurse": req.to_nurse,
        }))
        .into_response(),
        Err(e) => engine_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nurseflow_core::{Acuity, WardConfig};
    use nurseflow_engine::BalanceEngine;

    fn test_state() -> ApiState {
        let engine = BalanceEngine::from_config(&WardConfig::scaffold()).unwrap();
        ApiState::new(engine)
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn snapshot_ok() {
        let resp = get_snapshot(State(test_state())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["tick"], 0);
        assert_eq!(body["data"]["metrics"]["status"], "INADEQUATE");
    }

    #[tokio::test]
    async fn suggest_uses_default_limit() {
        let state = test_state().with_suggest_limit(3);
        let resp = suggest_transfers(State(state), Query(LimitParams::default()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn suggest_rejects_non_positive_k() {
        for k in [0, -4] {
            let resp = suggest_transfers(State(test_state()), Query(LimitParams { k: Some(k) }))
                .await
                .into_response();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn tick_advances() {
        let state = test_state();
        let resp = tick(State(state.clone())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["tick"], 1);
        assert_eq!(body["data"]["transfer"]["to_nurse"], "n09");
    }

    #[tokio::test]
    async fn tick_without_nurses_is_unprocessable() {
        let state = test_state();
        state.engine.init(Roster::default()).await.unwrap();
        let resp = tick(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unqualified_commands_conflict() {
        let state = test_state();

        // n01 holds telemetry, n02 does not.
        let req = AdmitRequest {
            patient: Patient::new("p50", Acuity::saturating(3), "telemetry"),
            nurse_id: "n01".to_string(),
        };
        let resp = admit_patient(State(state.clone()), Json(req)).await.into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = TransferRequest {
            patient_id: "p50".to_string(),
            to_nurse: "n02".to_string(),
        };
        let resp = force_transfer(State(state.clone()), Json(req)).await.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(state.engine.snapshot().await.counts[0], 8);

        let req = TransferRequest {
            patient_id: "p50".to_string(),
            to_nurse: "n09".to_string(),
        };
        let resp = force_transfer(State(state.clone()), Json(req)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = AdmitRequest {
            patient: Patient::new("p51", Acuity::saturating(2), "telemetry"),
            nurse_id: "n02".to_string(),
        };
        let resp = admit_patient(State(state), Json(req)).await.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn suggest_accepts_oversized_k() {
        let state = test_state();
        let all = state.engine.suggest_transfers(usize::MAX).await.unwrap().len();
        let resp = suggest_transfers(State(state), Query(LimitParams { k: Some(i64::MAX) }))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"].as_array().unwrap().len(), all);
    }

    #[tokio::test]
    async fn discharge_unknown_is_not_found() {
        let resp = discharge_patient(State(test_state()), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn recommendation_is_high_priority_for_scaffold() {
        let resp = recommend(State(test_state()), Query(LimitParams { k: Some(2) }))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["priority"], "high");
        assert_eq!(body["data"]["transfers"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["source"], "rule-based");
    }

    #[tokio::test]
    async fn reset_returns_metrics() {
        let state = test_state();
        tick(State(state.clone())).await;
        let resp = reset(State(state.clone()), Json(ResetRequest::default()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["mode"], "original");
        assert_eq!(body["data"]["metrics"]["max"], 7);
        assert_eq!(state.engine.snapshot().await.tick, 0);
    }
}
