use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use uuid::Uuid;

use crate::stream::error::{DeliveryFailureKind, StreamError, StreamResult};
use crate::stream::types::Frame;

/// Opaque identity of a client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending half of a connection's outbound queue.
///
/// Cheap to clone; the registry hands clones out for the duration of a broadcast.
#[derive(Clone)]
pub struct Outbox {
    id: ConnectionId,
    sender: mpsc::Sender<Frame>,
}

impl Outbox {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queue a frame, waiting at most `timeout` for room
    pub async fn deliver(&self, frame: Frame, timeout: Duration) -> StreamResult<()> {
        self.sender
            .send_timeout(frame, timeout)
            .await
            .map_err(|e| StreamError::DeliveryFailure {
                id: self.id,
                kind: match e {
                    SendTimeoutError::Closed(_) => DeliveryFailureKind::Closed,
                    SendTimeoutError::Timeout(_) => DeliveryFailureKind::Timeout,
                },
            })
    }
}

/// A live client connection as owned by the registry.
///
/// Not `Clone`: once the registry drops it the outbound queue closes and the
/// connection task shuts the socket, so a removed connection cannot come back.
pub struct Connection {
    outbox: Outbox,
    peer: Option<SocketAddr>,
    connected_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(sender: mpsc::Sender<Frame>, peer: Option<SocketAddr>) -> Self {
        Self {
            outbox: Outbox {
                id: ConnectionId::new(),
                sender,
            },
            peer,
            connected_at: Utc::now(),
        }
    }

    /// Create a connection together with the receiving end of its queue
    pub fn channel(buffer: usize, peer: Option<SocketAddr>) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx, peer), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.outbox.id
    }

    pub fn is_open(&self) -> bool {
        !self.outbox.is_closed()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.outbox.id,
            peer: self.peer,
            connected_at: self.connected_at,
        }
    }
}

/// Information about a connected client
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub peer: Option<SocketAddr>,
    pub connected_at: DateTime<Utc>,
}
