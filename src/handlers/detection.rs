use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Aggregate detector statistics
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionStats {
    pub total_detections: u32,
    pub average_confidence: f64,
    pub detections_by_type: BTreeMap<String, u32>,
    pub processing_speed: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Statistics about vehicle detections
pub async fn get_detection_stats() -> Json<DetectionStats> {
    let detections_by_type = [("car", 847), ("truck", 224), ("motorcycle", 176)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    Json(DetectionStats {
        total_detections: 1247,
        average_confidence: 93.5,
        detections_by_type,
        processing_speed: 30,
    })
}

/// Accept detector configuration. Nothing is applied; there is no real detector.
pub async fn update_detection_config(
    Json(config): Json<serde_json::Value>,
) -> Json<MessageResponse> {
    info!("Detection config received: {}", config);
    Json(MessageResponse {
        message: "Config updated successfully".to_string(),
    })
}
