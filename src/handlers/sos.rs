use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::incidents::{storage_error, ApiError};
use crate::state::ServerState;
use crate::storage::SosRecording;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordingListResponse {
    pub recordings: Vec<SosRecording>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordingDeletedResponse {
    pub id: String,
    pub status: String,
}

/// List SOS recordings, optionally only those of one user
pub async fn list_sos_recordings(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<RecordingsQuery>,
) -> Result<Json<RecordingListResponse>, ApiError> {
    let recordings = state
        .sos_store
        .list(query.user_id.as_deref())
        .await
        .map_err(storage_error)?;

    Ok(Json(RecordingListResponse {
        total: recordings.len(),
        recordings,
    }))
}

/// Delete an SOS recording
pub async fn delete_sos_recording(
    State(state): State<Arc<ServerState>>,
    Path(recording_id): Path<String>,
) -> Result<Json<RecordingDeletedResponse>, ApiError> {
    state
        .sos_store
        .delete(&recording_id)
        .await
        .map_err(storage_error)?;

    info!("SOS recording {} deleted", recording_id);
    Ok(Json(RecordingDeletedResponse {
        id: recording_id,
        status: "deleted".to_string(),
    }))
}
