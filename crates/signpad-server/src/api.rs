//! HTTP routes for requisition intake.

use crate::model::{
    CreatedResponse, DetailResponse, ListQuery, ListResponse, StoredRequisition, now_millis,
};
use crate::store::{RequisitionStore, StoreError};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use signpad_core::RequisitionSubmission;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Signature data URLs make bodies larger than axum's default limit.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RequisitionStore>,
}

impl AppState {
    pub fn new(store: impl RequisitionStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Errors returned to API clients as `{success: false, message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(StoreError::NotFound(_)) => "Requisition not found".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/requisitions",
            get(list_requisitions).post(create_requisition),
        )
        .route("/api/requisitions/{id}", get(get_requisition))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}

/// Store a submission. The signature data URL is kept as-is.
pub async fn create_requisition(
    State(state): State<AppState>,
    payload: Result<Json<RequisitionSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(submission) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if submission.requested_by.trim().is_empty() {
        return Err(ApiError::BadRequest("Requested by is required".to_string()));
    }

    let record = StoredRequisition::accept(submission, now_millis());
    let response = CreatedResponse {
        success: true,
        message: "Requisition created successfully".to_string(),
        id: record.id.clone(),
        request_number: record.request_number.clone(),
    };
    info!(
        "Accepted {} from {} ({} items)",
        record.request_number,
        record.submission.branch,
        record.submission.items.len()
    );
    state.store.save(record).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_requisitions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let requisitions: Vec<_> = state
        .store
        .list()
        .await?
        .iter()
        .filter(|r| query.kind.is_none_or(|kind| kind.matches(r.submission.purpose)))
        .map(StoredRequisition::summary)
        .collect();

    Ok(Json(ListResponse {
        success: true,
        total: requisitions.len(),
        requisitions,
    }))
}

pub async fn get_requisition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DetailResponse>, ApiError> {
    let requisition = state.store.load(&id).await?;
    Ok(Json(DetailResponse {
        success: true,
        requisition,
    }))
}
