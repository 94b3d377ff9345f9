use async_trait::async_trait;

use crate::storage::types::{
    Incident, IncidentFilter, IncidentId, IncidentPage, IncidentUpdate, NewIncident, SosRecording,
};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Incident not found: {0}")]
    IncidentNotFound(IncidentId),

    #[error("Recording not found: {0}")]
    RecordingNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Storage backend for incidents
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// List incidents matching `filter`, skipping `offset` and returning at most `limit`
    async fn list(
        &self,
        filter: &IncidentFilter,
        limit: usize,
        offset: usize,
    ) -> StorageResult<IncidentPage>;

    /// Get a single incident
    async fn get(&self, id: &str) -> StorageResult<Incident>;

    /// Record a new incident in the `open` state
    async fn create(&self, incident: NewIncident) -> StorageResult<Incident>;

    /// Apply a partial update and bump `updated_at`
    async fn update(&self, id: &str, update: IncidentUpdate) -> StorageResult<Incident>;

    /// Delete an incident
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Count incidents that are not resolved
    async fn count_unresolved(&self) -> StorageResult<usize>;
}

/// Storage backend for SOS recording metadata
#[async_trait]
pub trait SosRecordingStore: Send + Sync {
    /// All recordings, or only those of `user_id`, oldest first
    async fn list(&self, user_id: Option<&str>) -> StorageResult<Vec<SosRecording>>;

    /// Keep metadata for an uploaded recording
    async fn insert(&self, recording: SosRecording) -> StorageResult<()>;

    /// Delete a recording
    async fn delete(&self, id: &str) -> StorageResult<()>;
}
