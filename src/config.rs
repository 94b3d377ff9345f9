use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::stream::{GeneratorConfig, Location};

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// Delay between generator ticks
    pub tick_interval: Duration,
    /// Probability of a stats update per tick
    pub stats_probability: f64,
    /// Longest a broadcast waits on one client's full queue
    pub send_timeout: Duration,
    /// Frames buffered per connection before sends start waiting
    pub connection_buffer: usize,
    /// Maximum simultaneous stream clients
    pub max_connections: usize,
    /// Pause before restarting a faulted generator
    pub generator_restart_delay: Duration,
    /// Camera id stamped on generated detections
    pub camera_id: String,
    /// Intersection name stamped on generated detections
    pub intersection_name: String,
    /// CORS allowed origins (comma-separated in env var)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: "0.0.0.0".to_string(),
            tick_interval: Duration::from_millis(100),
            stats_probability: 0.05,
            send_timeout: Duration::from_millis(2000),
            connection_buffer: 64,
            max_connections: 10_000,
            generator_restart_delay: Duration::from_millis(1000),
            camera_id: "cam_001".to_string(),
            intersection_name: "Intersection A1".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("TRAFFIC_PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidPort)?,
            None => defaults.port,
        };

        let stats_probability: f64 =
            parse_or(&lookup, "STATS_PROBABILITY", defaults.stats_probability)?;
        if !(0.0..=1.0).contains(&stats_probability) {
            return Err(ConfigError::InvalidValue(
                "STATS_PROBABILITY must be between 0 and 1".to_string(),
            ));
        }

        let tick_interval_ms: u64 = parse_or(&lookup, "TICK_INTERVAL_MS", 100)?;
        if tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "TICK_INTERVAL_MS must be greater than 0".to_string(),
            ));
        }

        let connection_buffer: usize =
            parse_or(&lookup, "CONNECTION_BUFFER", defaults.connection_buffer)?;
        if connection_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "CONNECTION_BUFFER must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            port,
            bind_addr: lookup("TRAFFIC_BIND_ADDR").unwrap_or(defaults.bind_addr),
            tick_interval: Duration::from_millis(tick_interval_ms),
            stats_probability,
            send_timeout: Duration::from_millis(parse_or(&lookup, "SEND_TIMEOUT_MS", 2000)?),
            connection_buffer,
            max_connections: parse_or(&lookup, "MAX_CONNECTIONS", defaults.max_connections)?,
            generator_restart_delay: Duration::from_millis(parse_or(
                &lookup,
                "GENERATOR_RESTART_DELAY_MS",
                1000,
            )?),
            camera_id: lookup("CAMERA_ID").unwrap_or(defaults.camera_id),
            intersection_name: lookup("INTERSECTION_NAME").unwrap_or(defaults.intersection_name),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
        })
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Generator settings derived from this configuration
    pub fn generator_config(&self) -> GeneratorConfig {
        let defaults = GeneratorConfig::default();
        GeneratorConfig {
            tick_interval: self.tick_interval,
            stats_probability: self.stats_probability,
            camera_id: self.camera_id.clone(),
            location: Location {
                intersection: self.intersection_name.clone(),
                ..defaults.location
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{} has an invalid value: {}", key, v))),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
