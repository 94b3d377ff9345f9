use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{
    create_incident, delete_incident, delete_sos_recording, get_analytics_report,
    get_dashboard_stats, get_detection_stats, get_hourly_traffic, get_incident,
    get_incident_report, get_intersection_performance, get_recent_detections,
    get_traffic_summary, get_vehicle_distribution, get_vehicle_trend, health_check,
    list_incidents, list_sos_recordings, root, stream_chat, update_detection_config,
    update_incident,
};
use crate::state::ServerState;
use crate::stream::{handle_websocket, spawn_generator};

/// Build the HTTP router: REST endpoints plus the `/api/ws` stream
pub fn router(state: Arc<ServerState>) -> Router {
    let cors_origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/ws", get(handle_websocket))
        .route("/api/dashboard/stats", get(get_dashboard_stats))
        .route("/api/dashboard/vehicle-trend", get(get_vehicle_trend))
        .route("/api/dashboard/recent-detections", get(get_recent_detections))
        .route("/api/detection/stats", get(get_detection_stats))
        .route("/api/detection/config", post(update_detection_config))
        .route("/api/incidents", get(list_incidents).post(create_incident))
        .route(
            "/api/incidents/{incident_id}",
            get(get_incident).put(update_incident).delete(delete_incident),
        )
        .route("/api/analytics/hourly", get(get_hourly_traffic))
        .route("/api/analytics/distribution", get(get_vehicle_distribution))
        .route("/api/analytics/intersections", get(get_intersection_performance))
        .route("/api/reports/summary", get(get_traffic_summary))
        .route("/api/reports/incidents", get(get_incident_report))
        .route("/api/reports/analytics", get(get_analytics_report))
        .route("/api/sos-recordings", get(list_sos_recordings))
        .route("/api/sos-recordings/{recording_id}", delete(delete_sos_recording))
        .route("/api/chat", post(stream_chat))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Serve on `listener` with the shared generator running until `shutdown` resolves.
///
/// On shutdown the generator is stopped and every stream client is closed.
/// Fails before accepting connections if the generator settings are invalid.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let generator = spawn_generator(
        state.config.generator_config(),
        state.registry.clone(),
        state.config.generator_restart_delay,
    )
    .map_err(std::io::Error::other)?;

    let registry = state.registry.clone();
    let app = router(state);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        generator.abort();
        let closed = registry.close_all();
        info!("Shutting down, closed {} stream connections", closed);
    })
    .await
}
