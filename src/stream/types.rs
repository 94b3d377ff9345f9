use axum::extract::ws::Utf8Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::stream::error::{StreamError, StreamResult};

/// Encoded event as sent on the wire.
///
/// Reference counted: every connection in a broadcast clones the same buffer,
/// and the socket writes it without another copy.
pub type Frame = Utf8Bytes;

/// Vehicle classes the detector can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Car,
    Truck,
    Motorcycle,
    Bus,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Truck,
        VehicleClass::Motorcycle,
        VehicleClass::Bus,
    ];
}

/// Bounding box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where the camera that produced a detection is mounted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub intersection: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A single vehicle detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub id: String,
    #[serde(rename = "type")]
    pub vehicle_class: VehicleClass,
    /// Always within [0, 1]
    pub confidence: f64,
    pub timestamp: String,
    pub camera_id: String,
    pub bbox: BoundingBox,
    pub location: Location,
}

/// Aggregate counters pushed alongside the detection stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_vehicles: u32,
    pub active_incidents: u32,
    pub system_uptime: f64,
    pub avg_signal_efficiency: f64,
}

/// Payload of a stream event, tagged on the wire by `type` with the body under `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    Detection(Detection),
    StatsUpdate(StatsSnapshot),
}

/// Immutable message pushed to every connected client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub payload: EventPayload,
    pub timestamp: String,
}

impl Event {
    pub fn detection(detection: Detection, at: DateTime<Utc>) -> Self {
        Self {
            payload: EventPayload::Detection(detection),
            timestamp: format_timestamp(at),
        }
    }

    pub fn stats_update(stats: StatsSnapshot, at: DateTime<Utc>) -> Self {
        Self {
            payload: EventPayload::StatsUpdate(stats),
            timestamp: format_timestamp(at),
        }
    }

    /// Wire discriminant of this event
    pub fn kind(&self) -> &'static str {
        match self.payload {
            EventPayload::Detection(_) => "detection",
            EventPayload::StatsUpdate(_) => "stats_update",
        }
    }

    /// Encode to a JSON text frame
    pub fn encode(&self) -> StreamResult<Frame> {
        serde_json::to_string(self).map(Frame::from).map_err(|e| {
            StreamError::GeneratorFault(format!("failed to encode {} event: {}", self.kind(), e))
        })
    }
}

/// ISO-8601 / RFC 3339 with millisecond precision
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn sample_detection(at: DateTime<Utc>) -> Detection {
        Detection {
            id: "det_1234".to_string(),
            vehicle_class: VehicleClass::Motorcycle,
            confidence: 0.91,
            timestamp: format_timestamp(at),
            camera_id: "cam_001".to_string(),
            bbox: BoundingBox {
                x: 12,
                y: 40,
                width: 150,
                height: 90,
            },
            location: Location {
                intersection: "Intersection A1".to_string(),
                latitude: 40.7128,
                longitude: -74.006,
            },
        }
    }

    #[test]
    fn test_detection_wire_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 32, 0).unwrap();
        let event = Event::detection(sample_detection(at), at);

        let frame = event.encode().unwrap();
        let json: Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(json["type"], "detection");
        assert_eq!(json["timestamp"], "2024-01-15T14:32:00.000Z");
        assert_eq!(json["data"]["id"], "det_1234");
        assert_eq!(json["data"]["type"], "motorcycle");
        assert_eq!(json["data"]["confidence"], 0.91);
        assert_eq!(json["data"]["cameraId"], "cam_001");
        assert_eq!(json["data"]["bbox"]["width"], 150);
        assert_eq!(json["data"]["location"]["intersection"], "Intersection A1");
    }

    #[test]
    fn test_stats_wire_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 32, 0).unwrap();
        let event = Event::stats_update(
            StatsSnapshot {
                total_vehicles: 1500,
                active_incidents: 2,
                system_uptime: 99.9,
                avg_signal_efficiency: 87.4,
            },
            at,
        );

        let json: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();

        assert_eq!(json["type"], "stats_update");
        assert_eq!(json["data"]["totalVehicles"], 1500);
        assert_eq!(json["data"]["activeIncidents"], 2);
        assert_eq!(json["data"]["systemUptime"], 99.9);
        assert_eq!(json["data"]["avgSignalEfficiency"], 87.4);
        assert_eq!(event.kind(), "stats_update");
    }

    #[test]
    fn test_event_decodes_from_frame() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let event = Event::detection(sample_detection(at), at);

        let decoded: Event = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert_eq!(decoded.timestamp, event.timestamp);
        match decoded.payload {
            EventPayload::Detection(d) => {
                assert_eq!(d.id, "det_1234");
                assert_eq!(d.vehicle_class, VehicleClass::Motorcycle);
                assert_eq!(d.bbox.height, 90);
            }
            other => panic!("expected detection, got {:?}", other),
        }
    }
}
