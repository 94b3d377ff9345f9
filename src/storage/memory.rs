use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::storage::traits::{IncidentStore, StorageError, StorageResult};
use crate::storage::types::{
    Incident, IncidentFilter, IncidentPage, IncidentStatus, IncidentUpdate, NewIncident, Severity,
};

/// Maximum lengths for input validation
const MAX_TYPE_LENGTH: usize = 128;
const MAX_DESCRIPTION_LENGTH: usize = 4096;

struct Inner {
    incidents: Vec<Incident>,
    next_seq: u32,
}

/// Process-local incident store. Contents are lost on restart.
pub struct InMemoryIncidentStore {
    inner: RwLock<Inner>,
}

impl InMemoryIncidentStore {
    pub fn new() -> Self {
        Self::with_incidents(Vec::new())
    }

    pub fn with_incidents(incidents: Vec<Incident>) -> Self {
        let next_seq = incidents.len() as u32 + 1;
        Self {
            inner: RwLock::new(Inner {
                incidents,
                next_seq,
            }),
        }
    }

    /// Store seeded with the demo incident the dashboard expects
    pub fn seeded() -> Self {
        let now = Utc::now();
        Self::with_incidents(vec![Incident {
            id: "inc_001".to_string(),
            incident_type: "Signal Malfunction".to_string(),
            intersection_id: "int_001".to_string(),
            severity: Severity::Critical,
            status: IncidentStatus::InProgress,
            description: "Red light stuck on for 45 seconds".to_string(),
            created_at: now,
            updated_at: now,
            assigned_to: Some("operator_001".to_string()),
        }])
    }
}

impl Default for InMemoryIncidentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_new(incident: &NewIncident) -> StorageResult<()> {
    if incident.incident_type.trim().is_empty() {
        return Err(StorageError::InvalidInput("Incident type is required".to_string()));
    }
    if incident.incident_type.len() > MAX_TYPE_LENGTH {
        return Err(StorageError::InvalidInput("Incident type too long".to_string()));
    }
    if incident.intersection_id.trim().is_empty() {
        return Err(StorageError::InvalidInput("Intersection id is required".to_string()));
    }
    if incident.description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(StorageError::InvalidInput("Description too long".to_string()));
    }
    Ok(())
}

#[async_trait]
impl IncidentStore for InMemoryIncidentStore {
    async fn list(
        &self,
        filter: &IncidentFilter,
        limit: usize,
        offset: usize,
    ) -> StorageResult<IncidentPage> {
        let inner = self.inner.read();
        let matching: Vec<&Incident> = inner
            .incidents
            .iter()
            .filter(|i| filter.matches(i))
            .collect();

        Ok(IncidentPage {
            total: matching.len(),
            items: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }

    async fn get(&self, id: &str) -> StorageResult<Incident> {
        self.inner
            .read()
            .incidents
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| StorageError::IncidentNotFound(id.to_string()))
    }

    async fn create(&self, incident: NewIncident) -> StorageResult<Incident> {
        validate_new(&incident)?;

        let now = Utc::now();
        let mut inner = self.inner.write();
        let created = Incident {
            id: format!("inc_{:03}", inner.next_seq),
            incident_type: incident.incident_type,
            intersection_id: incident.intersection_id,
            severity: incident.severity,
            status: IncidentStatus::Open,
            description: incident.description,
            created_at: now,
            updated_at: now,
            assigned_to: None,
        };
        inner.next_seq += 1;
        inner.incidents.push(created.clone());

        Ok(created)
    }

    async fn update(&self, id: &str, update: IncidentUpdate) -> StorageResult<Incident> {
        if let Some(ref desc) = update.description {
            if desc.len() > MAX_DESCRIPTION_LENGTH {
                return Err(StorageError::InvalidInput("Description too long".to_string()));
            }
        }

        let mut inner = self.inner.write();
        let incident = inner
            .incidents
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StorageError::IncidentNotFound(id.to_string()))?;

        if let Some(status) = update.status {
            incident.status = status;
        }
        if let Some(severity) = update.severity {
            incident.severity = severity;
        }
        if let Some(description) = update.description {
            incident.description = description;
        }
        if let Some(assigned_to) = update.assigned_to {
            incident.assigned_to = Some(assigned_to);
        }
        incident.updated_at = Utc::now();

        Ok(incident.clone())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let mut inner = self.inner.write();
        let before = inner.incidents.len();
        inner.incidents.retain(|i| i.id != id);

        if inner.incidents.len() == before {
            return Err(StorageError::IncidentNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn count_unresolved(&self) -> StorageResult<usize> {
        Ok(self
            .inner
            .read()
            .incidents
            .iter()
            .filter(|i| i.status != IncidentStatus::Resolved)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_incident(severity: Severity) -> NewIncident {
        NewIncident {
            incident_type: "Collision".to_string(),
            intersection_id: "int_002".to_string(),
            severity,
            description: "Two-car collision, lane blocked".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryIncidentStore::seeded();

        let created = store.create(new_incident(Severity::High)).await.unwrap();

        assert_eq!(created.id, "inc_002");
        assert_eq!(created.status, IncidentStatus::Open);
        assert_eq!(store.get("inc_002").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = InMemoryIncidentStore::new();

        let first = store.create(new_incident(Severity::Low)).await.unwrap();
        store.delete(&first.id).await.unwrap();
        let second = store.create(new_incident(Severity::Low)).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let store = InMemoryIncidentStore::seeded();
        for _ in 0..3 {
            store.create(new_incident(Severity::Low)).await.unwrap();
        }

        let filter = IncidentFilter {
            severity: Some(Severity::Low),
            ..Default::default()
        };
        let page = store.list(&filter, 2, 0).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);

        let page = store.list(&filter, 2, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);

        let filter = IncidentFilter {
            status: Some(IncidentStatus::InProgress),
            ..Default::default()
        };
        let page = store.list(&filter, 100, 0).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "inc_001");
    }

    #[tokio::test]
    async fn test_update_applies_only_given_fields() {
        let store = InMemoryIncidentStore::seeded();
        let before = store.get("inc_001").await.unwrap();

        let updated = store
            .update(
                "inc_001",
                IncidentUpdate {
                    status: Some(IncidentStatus::Resolved),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, IncidentStatus::Resolved);
        assert_eq!(updated.severity, before.severity);
        assert_eq!(updated.description, before.description);
        assert!(updated.updated_at >= before.updated_at);
        assert_eq!(store.count_unresolved().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_incident_is_not_found() {
        let store = InMemoryIncidentStore::seeded();

        assert!(matches!(
            store.get("inc_999").await,
            Err(StorageError::IncidentNotFound(_))
        ));
        assert!(matches!(
            store.update("inc_999", IncidentUpdate::default()).await,
            Err(StorageError::IncidentNotFound(_))
        ));
        assert!(matches!(
            store.delete("inc_999").await,
            Err(StorageError::IncidentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_type() {
        let store = InMemoryIncidentStore::new();
        let mut incident = new_incident(Severity::Medium);
        incident.incident_type = "  ".to_string();

        assert!(matches!(
            store.create(incident).await,
            Err(StorageError::InvalidInput(_))
        ));
    }
}
