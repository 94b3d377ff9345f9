use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::stream::connection::{Connection, ConnectionId, ConnectionInfo, Outbox};
use crate::stream::error::{StreamError, StreamResult};
use crate::stream::types::{Event, Frame};

/// Default maximum connections to prevent DoS
const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

/// Default bound on how long one slow client can hold up a broadcast
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of fanning one event out to the live set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Connections the frame was queued for
    pub delivered: usize,
    /// Connections removed because delivery failed
    pub dropped: Vec<ConnectionId>,
}

/// In-memory registry of live client connections.
///
/// Iteration order is insertion order. The lock is never held across an await.
#[derive(Clone)]
pub struct BroadcastRegistry {
    connections: Arc<RwLock<Vec<Connection>>>,
    max_connections: usize,
    send_timeout: Duration,
}

impl BroadcastRegistry {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_CONNECTIONS, DEFAULT_SEND_TIMEOUT)
    }

    /// Create registry with custom max connections and per-send timeout
    pub fn with_limits(max_connections: usize, send_timeout: Duration) -> Self {
        Self {
            connections: Arc::new(RwLock::new(Vec::new())),
            max_connections,
            send_timeout,
        }
    }

    /// Add a newly accepted connection to the live set
    pub fn register(&self, connection: Connection) -> StreamResult<()> {
        if !connection.is_open() {
            return Err(StreamError::InvalidConnectionState(connection.id()));
        }

        let mut connections = self.connections.write();

        if connections.len() >= self.max_connections {
            return Err(StreamError::AtCapacity(self.max_connections));
        }

        connections.push(connection);
        Ok(())
    }

    /// Remove a connection. Removing an absent connection is a no-op.
    ///
    /// Returns whether a connection was removed. Dropping it closes its queue.
    pub fn deregister(&self, id: &ConnectionId) -> bool {
        let removed = {
            let mut connections = self.connections.write();
            connections
                .iter()
                .position(|c| c.id() == *id)
                .map(|idx| connections.remove(idx))
        };
        removed.is_some()
    }

    /// Check if a connection is live
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.read().iter().any(|c| c.id() == *id)
    }

    /// Get the count of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }

    /// Get info on all live connections, in insertion order
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.connections.read().iter().map(Connection::info).collect()
    }

    /// Drop every connection, closing their queues. Returns how many were live.
    pub fn close_all(&self) -> usize {
        let drained: Vec<Connection> = self.connections.write().drain(..).collect();
        drained.len()
    }

    /// Encode `event` once and deliver it to every live connection.
    ///
    /// Delivery failures are handled here by deregistering the failed connection;
    /// the only error returned is a failure to encode the event.
    pub async fn broadcast(&self, event: &Event) -> StreamResult<BroadcastOutcome> {
        if self.is_empty() {
            return Ok(BroadcastOutcome::default());
        }
        let frame = event.encode()?;
        Ok(self.broadcast_frame(frame).await)
    }

    /// Deliver an already encoded frame to every connection live at call time
    pub async fn broadcast_frame(&self, frame: Frame) -> BroadcastOutcome {
        let snapshot: Vec<Outbox> = self
            .connections
            .read()
            .iter()
            .map(|c| c.outbox().clone())
            .collect();

        if snapshot.is_empty() {
            return BroadcastOutcome::default();
        }

        let timeout = self.send_timeout;
        let results = join_all(
            snapshot
                .iter()
                .map(|outbox| outbox.deliver(frame.clone(), timeout)),
        )
        .await;

        let mut outcome = BroadcastOutcome::default();
        for (outbox, result) in snapshot.iter().zip(results) {
            match result {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    warn!("Dropping connection: {}", e);
                    if self.deregister(&outbox.id()) {
                        outcome.dropped.push(outbox.id());
                    }
                }
            }
        }

        debug!(
            "Broadcast delivered to {} connections, dropped {}",
            outcome.delivered,
            outcome.dropped.len()
        );
        outcome
    }
}

impl Default for BroadcastRegistry {
    fn default() -> Self {
        Self::new()
    }
}
