use std::fmt;

use crate::stream::connection::ConnectionId;

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors that can occur in the broadcast subsystem
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Connection {0} is already closed")]
    InvalidConnectionState(ConnectionId),

    #[error("Registry at capacity ({0} connections)")]
    AtCapacity(usize),

    #[error("Delivery to connection {id} failed: {kind}")]
    DeliveryFailure { id: ConnectionId, kind: DeliveryFailureKind },

    #[error("Event generator fault: {0}")]
    GeneratorFault(String),

    #[error("Invalid generator configuration: {0}")]
    InvalidConfig(String),
}

/// Why a single delivery did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailureKind {
    /// The connection task is gone
    Closed,
    /// The outbound queue stayed full for the whole send timeout
    Timeout,
}

impl fmt::Display for DeliveryFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailureKind::Closed => write!(f, "connection closed"),
            DeliveryFailureKind::Timeout => write!(f, "send timed out"),
        }
    }
}

/// How a client session ended. Not an error: every variant leads to deregistration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Client sent a Close frame
    ClientClosed,
    /// Inbound stream ended without a Close frame
    StreamEnded,
    /// Socket read or write failed
    TransportError(String),
    /// Registry dropped the connection (failed delivery or server shutdown)
    Evicted,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::ClientClosed => write!(f, "closed by client"),
            DisconnectReason::StreamEnded => write!(f, "stream ended"),
            DisconnectReason::TransportError(e) => write!(f, "transport error: {}", e),
            DisconnectReason::Evicted => write!(f, "evicted by server"),
        }
    }
}
