use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for incidents, e.g. `inc_001`
pub type IncidentId = String;

/// How urgent an incident is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Where an incident is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentStatus {
    Open,
    InProgress,
    Resolved,
}

/// A reported traffic incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: IncidentId,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub intersection_id: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// Fields supplied when reporting a new incident
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    #[serde(rename = "type")]
    pub incident_type: String,
    pub intersection_id: String,
    pub severity: Severity,
    pub description: String,
}

/// Where an SOS recording was captured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Metadata of an uploaded SOS video recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosRecording {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    /// Length in seconds
    pub duration: u32,
    pub location: RecordingLocation,
    pub url: String,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdate {
    pub status: Option<IncidentStatus>,
    pub severity: Option<Severity>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
}

/// Filter for listing incidents
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub severity: Option<Severity>,
}

impl IncidentFilter {
    pub fn matches(&self, incident: &Incident) -> bool {
        self.status.map_or(true, |s| incident.status == s)
            && self.severity.map_or(true, |s| incident.severity == s)
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone)]
pub struct IncidentPage {
    pub items: Vec<Incident>,
    /// Matches before pagination
    pub total: usize,
}
