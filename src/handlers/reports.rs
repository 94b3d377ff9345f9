use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::analytics::{hourly_counts, HourlyCount};

/// Reporting period, plus an incident type filter for the incident report
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub incident_type: Option<String>,
}

/// Traffic summary for a reporting period
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSummary {
    pub total_vehicles: u32,
    pub average_speed: f64,
    /// Low, Medium or High
    pub traffic_density: String,
    pub incident_count: u32,
    pub detection_accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedIncident {
    pub id: u32,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub location: String,
    pub timestamp: String,
    pub severity: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncidentReport {
    pub incidents: Vec<ReportedIncident>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportVehicles {
    pub cars: u32,
    pub trucks: u32,
    pub motorcycles: u32,
    pub buses: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub vehicles: ReportVehicles,
    pub hourly_trends: Vec<HourlyCount>,
}

pub async fn get_traffic_summary(Query(query): Query<ReportQuery>) -> Json<TrafficSummary> {
    debug!("Traffic summary from {:?} to {:?}", query.start_date, query.end_date);

    Json(TrafficSummary {
        total_vehicles: 15420,
        average_speed: 45.2,
        traffic_density: "Medium".to_string(),
        incident_count: 23,
        detection_accuracy: 94.8,
    })
}

/// Incident report, optionally narrowed to one incident type (case-insensitive)
pub async fn get_incident_report(Query(query): Query<ReportQuery>) -> Json<IncidentReport> {
    debug!("Incident report from {:?} to {:?}", query.start_date, query.end_date);

    let incidents = [ReportedIncident {
        id: 1,
        incident_type: "Accident".to_string(),
        location: "Main Street & 5th Ave".to_string(),
        timestamp: "2024-02-14T10:30:00Z".to_string(),
        severity: "High".to_string(),
    }];

    Json(IncidentReport {
        incidents: incidents
            .into_iter()
            .filter(|i| match &query.incident_type {
                Some(wanted) => i.incident_type.eq_ignore_ascii_case(wanted),
                None => true,
            })
            .collect(),
    })
}

pub async fn get_analytics_report(Query(query): Query<ReportQuery>) -> Json<AnalyticsReport> {
    debug!("Analytics report from {:?} to {:?}", query.start_date, query.end_date);

    Json(AnalyticsReport {
        vehicles: ReportVehicles {
            cars: 8200,
            trucks: 2100,
            motorcycles: 1200,
            buses: 520,
        },
        hourly_trends: hourly_counts(&[("00:00", 120), ("06:00", 450)]),
    })
}
