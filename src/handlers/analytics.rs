use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reporting window shared by the analytics endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub intersection_id: Option<String>,
}

/// Vehicle count for one hour of the day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyCount {
    pub hour: String,
    pub count: u32,
}

/// Vehicles seen per class over the window
#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleDistribution {
    pub cars: u32,
    pub trucks: u32,
    pub motorcycles: u32,
}

/// Signal efficiency of one intersection
#[derive(Debug, Serialize, Deserialize)]
pub struct IntersectionPerformance {
    pub id: String,
    pub efficiency: f64,
}

pub(super) fn hourly_counts(rows: &[(&str, u32)]) -> Vec<HourlyCount> {
    rows.iter()
        .map(|(hour, count)| HourlyCount {
            hour: hour.to_string(),
            count: *count,
        })
        .collect()
}

/// Hourly traffic volume
pub async fn get_hourly_traffic(Query(query): Query<AnalyticsQuery>) -> Json<Vec<HourlyCount>> {
    debug!(
        "Hourly traffic for {:?} from {:?} to {:?}",
        query.intersection_id, query.start_date, query.end_date
    );

    Json(hourly_counts(&[("00:00", 120), ("01:00", 150), ("02:00", 80)]))
}

/// Vehicle class distribution
pub async fn get_vehicle_distribution(
    Query(query): Query<AnalyticsQuery>,
) -> Json<VehicleDistribution> {
    debug!(
        "Vehicle distribution from {:?} to {:?}",
        query.start_date, query.end_date
    );

    Json(VehicleDistribution {
        cars: 8200,
        trucks: 2100,
        motorcycles: 1200,
    })
}

/// Per-intersection performance
pub async fn get_intersection_performance(
    Query(query): Query<AnalyticsQuery>,
) -> Json<Vec<IntersectionPerformance>> {
    debug!(
        "Intersection performance from {:?} to {:?}",
        query.start_date, query.end_date
    );

    Json(vec![IntersectionPerformance {
        id: "int_A1".to_string(),
        efficiency: 94.8,
    }])
}
