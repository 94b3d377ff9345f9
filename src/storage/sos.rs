use async_trait::async_trait;
use parking_lot::RwLock;

use crate::storage::traits::{SosRecordingStore, StorageError, StorageResult};
use crate::storage::types::SosRecording;

/// Process-local SOS recording index. Starts empty.
#[derive(Default)]
pub struct InMemorySosRecordingStore {
    recordings: RwLock<Vec<SosRecording>>,
}

impl InMemorySosRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SosRecordingStore for InMemorySosRecordingStore {
    async fn list(&self, user_id: Option<&str>) -> StorageResult<Vec<SosRecording>> {
        Ok(self
            .recordings
            .read()
            .iter()
            .filter(|r| user_id.map_or(true, |user| r.user_id == user))
            .cloned()
            .collect())
    }

    async fn insert(&self, recording: SosRecording) -> StorageResult<()> {
        if recording.user_id.trim().is_empty() {
            return Err(StorageError::InvalidInput("User id is required".to_string()));
        }

        let mut recordings = self.recordings.write();
        if recordings.iter().any(|r| r.id == recording.id) {
            return Err(StorageError::InvalidInput(format!(
                "Recording {} already exists",
                recording.id
            )));
        }
        recordings.push(recording);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let mut recordings = self.recordings.write();
        let before = recordings.len();
        recordings.retain(|r| r.id != id);

        if recordings.len() == before {
            return Err(StorageError::RecordingNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::RecordingLocation;
    use chrono::Utc;

    fn recording(id: &str, user_id: &str) -> SosRecording {
        SosRecording {
            id: id.to_string(),
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            duration: 30,
            location: RecordingLocation {
                latitude: 40.7128,
                longitude: -74.006,
            },
            url: format!("/static/sos-recordings/{}.webm", id),
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let store = InMemorySosRecordingStore::new();
        store.insert(recording("rec_1", "user_a")).await.unwrap();
        store.insert(recording("rec_2", "user_b")).await.unwrap();
        store.insert(recording("rec_3", "user_a")).await.unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let ids: Vec<String> = store
            .list(Some("user_a"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["rec_1", "rec_3"]);
    }

    #[tokio::test]
    async fn test_delete_missing_recording_is_not_found() {
        let store = InMemorySosRecordingStore::new();
        store.insert(recording("rec_1", "user_a")).await.unwrap();

        store.delete("rec_1").await.unwrap();

        assert!(matches!(
            store.delete("rec_1").await,
            Err(StorageError::RecordingNotFound(_))
        ));
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = InMemorySosRecordingStore::new();
        store.insert(recording("rec_1", "user_a")).await.unwrap();

        assert!(matches!(
            store.insert(recording("rec_1", "user_b")).await,
            Err(StorageError::InvalidInput(_))
        ));
    }
}
