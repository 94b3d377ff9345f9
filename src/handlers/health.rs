use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::ServerState;
use crate::stream::ConnectionInfo;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub connected_clients: usize,
    /// Live stream clients in connection order
    pub clients: Vec<ConnectionInfo>,
    pub uptime_seconds: u64,
}

/// Root banner response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// API banner
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Traffic Signal Detection System API".to_string(),
    })
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<Arc<ServerState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let clients = state.registry.connections();
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connected_clients: clients.len(),
        clients,
        uptime_seconds: state.uptime_seconds(),
    };

    (StatusCode::OK, Json(response))
}
