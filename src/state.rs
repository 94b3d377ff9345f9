use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::storage::{
    InMemoryIncidentStore, InMemorySosRecordingStore, IncidentStore, SosRecordingStore,
};
use crate::stream::BroadcastRegistry;

/// Main server state shared across all handlers
pub struct ServerState {
    pub config: ServerConfig,
    pub registry: BroadcastRegistry,
    pub incident_store: Arc<dyn IncidentStore>,
    pub sos_store: Arc<dyn SosRecordingStore>,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        incident_store: Arc<dyn IncidentStore>,
        sos_store: Arc<dyn SosRecordingStore>,
    ) -> Self {
        let registry = BroadcastRegistry::with_limits(config.max_connections, config.send_timeout);

        Self {
            config,
            registry,
            incident_store,
            sos_store,
            start_time: Instant::now(),
        }
    }

    /// State backed by the in-memory stores, incidents seeded with the demo entry
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryIncidentStore::seeded()),
            Arc::new(InMemorySosRecordingStore::new()),
        )
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
