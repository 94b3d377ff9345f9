use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::state::ServerState;
use crate::storage::{
    Incident, IncidentFilter, IncidentStatus, IncidentUpdate, NewIncident, Severity, StorageError,
};

/// Upper bound on page size
const MAX_PAGE_SIZE: usize = 500;

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListIncidentsQuery {
    pub status: Option<IncidentStatus>,
    pub severity: Option<Severity>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    100
}

/// Pagination block of a list response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_next_page: bool,
}

/// Incident list response
#[derive(Debug, Serialize)]
pub struct IncidentListResponse {
    pub data: Vec<Incident>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub(super) type ApiError = (StatusCode, Json<ErrorResponse>);

fn not_found(what: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{} not found", what),
            code: "NOT_FOUND".to_string(),
        }),
    )
}

pub(super) fn storage_error(e: StorageError) -> ApiError {
    match e {
        StorageError::IncidentNotFound(_) => not_found("Incident"),
        StorageError::RecordingNotFound(_) => not_found("Recording"),
        StorageError::InvalidInput(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: msg,
                code: "INVALID_INPUT".to_string(),
            }),
        ),
    }
}

/// List incidents, optionally filtered by status and severity
pub async fn list_incidents(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListIncidentsQuery>,
) -> Result<Json<IncidentListResponse>, ApiError> {
    if query.limit == 0 || query.limit > MAX_PAGE_SIZE {
        return Err(storage_error(StorageError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        ))));
    }

    let filter = IncidentFilter {
        status: query.status,
        severity: query.severity,
    };
    let page = state
        .incident_store
        .list(&filter, query.limit, query.offset)
        .await
        .map_err(|e| {
            error!("Failed to list incidents: {}", e);
            storage_error(e)
        })?;

    Ok(Json(IncidentListResponse {
        pagination: Pagination {
            total: page.total,
            page: query.offset / query.limit + 1,
            page_size: query.limit,
            has_next_page: query.offset.saturating_add(query.limit) < page.total,
        },
        data: page.items,
    }))
}

/// Get a single incident
pub async fn get_incident(
    State(state): State<Arc<ServerState>>,
    Path(incident_id): Path<String>,
) -> Result<Json<Incident>, ApiError> {
    state
        .incident_store
        .get(&incident_id)
        .await
        .map(Json)
        .map_err(storage_error)
}

/// Report a new incident
pub async fn create_incident(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<NewIncident>,
) -> Result<(StatusCode, Json<Incident>), ApiError> {
    let incident = state
        .incident_store
        .create(request)
        .await
        .map_err(storage_error)?;

    info!(
        "Incident {} reported at {} ({:?})",
        incident.id, incident.intersection_id, incident.severity
    );
    Ok((StatusCode::CREATED, Json(incident)))
}

/// Update an existing incident
pub async fn update_incident(
    State(state): State<Arc<ServerState>>,
    Path(incident_id): Path<String>,
    Json(update): Json<IncidentUpdate>,
) -> Result<Json<Incident>, ApiError> {
    state
        .incident_store
        .update(&incident_id, update)
        .await
        .map(Json)
        .map_err(storage_error)
}

/// Delete an incident
pub async fn delete_incident(
    State(state): State<Arc<ServerState>>,
    Path(incident_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state
        .incident_store
        .delete(&incident_id)
        .await
        .map_err(storage_error)?;

    info!("Incident {} deleted", incident_id);
    Ok(Json(DeleteResponse { success: true }))
}
