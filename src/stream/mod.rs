//! Real-time detection stream: connection registry, event generator and the
//! WebSocket endpoint that ties them together.

mod connection;
mod error;
mod generator;
mod registry;
mod types;
pub mod websocket;

pub use connection::{Connection, ConnectionId, ConnectionInfo, Outbox};
pub use error::{DeliveryFailureKind, DisconnectReason, StreamError, StreamResult};
pub use generator::{spawn_generator, EventGenerator, GeneratorConfig};
pub use registry::{BroadcastOutcome, BroadcastRegistry};
pub use types::{
    format_timestamp, BoundingBox, Detection, Event, EventPayload, Frame, Location,
    StatsSnapshot, VehicleClass,
};
pub use websocket::handle_websocket;
