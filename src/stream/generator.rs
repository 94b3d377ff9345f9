use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::stream::error::{StreamError, StreamResult};
use crate::stream::registry::BroadcastRegistry;
use crate::stream::types::{
    format_timestamp, BoundingBox, Detection, Event, Location, StatsSnapshot, VehicleClass,
};

/// Configuration for the synthetic event stream
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Delay between ticks
    pub tick_interval: Duration,
    /// Chance per tick of an extra stats update, in [0, 1]
    pub stats_probability: f64,
    /// Camera reported on every detection
    pub camera_id: String,
    /// Location reported on every detection
    pub location: Location,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            stats_probability: 0.05,
            camera_id: "cam_001".to_string(),
            location: Location {
                intersection: "Intersection A1".to_string(),
                latitude: 40.7128,
                longitude: -74.0060,
            },
        }
    }
}

impl GeneratorConfig {
    /// Reject settings the run loop cannot honour
    pub fn validate(&self) -> StreamResult<()> {
        if self.tick_interval.is_zero() {
            return Err(StreamError::InvalidConfig(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.stats_probability) {
            return Err(StreamError::InvalidConfig(format!(
                "stats probability must be within [0, 1], got {}",
                self.stats_probability
            )));
        }
        Ok(())
    }

    /// Stats chance usable by `gen_bool` whatever the configured value
    fn stats_chance(&self) -> f64 {
        if self.stats_probability.is_nan() {
            0.0
        } else {
            self.stats_probability.clamp(0.0, 1.0)
        }
    }
}

/// Produces detection and stats events on a fixed cadence.
///
/// Randomness comes from `R` so tests can seed it.
pub struct EventGenerator<R = StdRng> {
    config: GeneratorConfig,
    rng: R,
}

impl EventGenerator<StdRng> {
    /// Generator seeded from OS entropy
    pub fn from_entropy(config: GeneratorConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }

    /// Generator producing a reproducible sequence
    pub fn seeded(config: GeneratorConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EventGenerator<R> {
    pub fn new(config: GeneratorConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build one synthetic detection stamped with `now`
    pub fn next_detection(&mut self, now: DateTime<Utc>) -> Detection {
        let class_idx = self.rng.gen_range(0..VehicleClass::ALL.len());
        let confidence: f64 = self.rng.gen_range(0.80..=0.99);

        Detection {
            id: format!("det_{}", self.rng.gen_range(1000..=9999)),
            vehicle_class: VehicleClass::ALL[class_idx],
            confidence: round_to(confidence, 2).clamp(0.80, 0.99),
            timestamp: format_timestamp(now),
            camera_id: self.config.camera_id.clone(),
            bbox: BoundingBox {
                x: self.rng.gen_range(0..=500),
                y: self.rng.gen_range(0..=300),
                width: self.rng.gen_range(100..=200),
                height: self.rng.gen_range(80..=150),
            },
            location: self.config.location.clone(),
        }
    }

    /// Build one range-bounded stats snapshot
    pub fn next_stats(&mut self) -> StatsSnapshot {
        let efficiency: f64 = self.rng.gen_range(80.0..=100.0);

        StatsSnapshot {
            total_vehicles: self.rng.gen_range(1000..=2000),
            active_incidents: self.rng.gen_range(0..=5),
            system_uptime: 99.9,
            avg_signal_efficiency: round_to(efficiency, 1),
        }
    }

    /// Events for a single tick: always one detection, sometimes a stats update
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = vec![Event::detection(self.next_detection(now), now)];

        if self.rng.gen_bool(self.config.stats_chance()) {
            events.push(Event::stats_update(self.next_stats(), now));
        }

        events
    }
}

impl<R: Rng + Send> EventGenerator<R> {
    /// Run forever, broadcasting every tick's events to `registry`.
    ///
    /// Only returns on a generator fault or an invalid configuration.
    pub async fn run(mut self, registry: BroadcastRegistry) -> StreamResult<()> {
        self.config.validate()?;

        let mut ticker = time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            for event in self.tick(Utc::now()) {
                let outcome = registry.broadcast(&event).await?;
                if !outcome.dropped.is_empty() {
                    debug!(
                        "{} event dropped {} failing connections",
                        event.kind(),
                        outcome.dropped.len()
                    );
                }
            }
        }
    }
}

/// Spawn the shared generator and restart it whenever it faults.
///
/// Fails up front if `config` is invalid.
pub fn spawn_generator(
    config: GeneratorConfig,
    registry: BroadcastRegistry,
    restart_delay: Duration,
) -> StreamResult<JoinHandle<()>> {
    config.validate()?;

    info!(
        "Event generator running every {:?} (stats probability {})",
        config.tick_interval, config.stats_probability
    );
    Ok(tokio::spawn(supervise(restart_delay, move || {
        EventGenerator::from_entropy(config.clone()).run(registry.clone())
    })))
}

/// Drive runs produced by `start` until one ends cleanly.
///
/// A `GeneratorFault` schedules a fresh run after `restart_delay`; any other
/// error stops supervision since a restart would fail the same way.
pub async fn supervise<F, Fut>(restart_delay: Duration, mut start: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StreamResult<()>>,
{
    loop {
        match start().await {
            Ok(()) => {
                info!("Event generator stopped");
                break;
            }
            Err(e @ StreamError::GeneratorFault(_)) => {
                error!("{}; restarting in {:?}", e, restart_delay);
                time::sleep(restart_delay).await;
            }
            Err(e) => {
                error!("Event generator cannot run: {}", e);
                break;
            }
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::connection::Connection;
    use crate::stream::types::EventPayload;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 32, 0).unwrap()
    }

    #[test]
    fn test_confidence_and_bbox_bounds() {
        let mut generator = EventGenerator::seeded(GeneratorConfig::default(), 7);

        for _ in 0..5_000 {
            let d = generator.next_detection(fixed_now());
            assert!((0.80..=0.99).contains(&d.confidence), "confidence {}", d.confidence);
            assert!((100..=200).contains(&d.bbox.width), "width {}", d.bbox.width);
            assert!((80..=150).contains(&d.bbox.height), "height {}", d.bbox.height);
            assert!(d.bbox.x <= 500);
            assert!(d.bbox.y <= 300);
            assert!(d.id.starts_with("det_"));
            assert_eq!(d.id.len(), 8);
        }
    }

    #[test]
    fn test_stats_bounds() {
        let mut generator = EventGenerator::seeded(GeneratorConfig::default(), 11);

        for _ in 0..1_000 {
            let s = generator.next_stats();
            assert!((1000..=2000).contains(&s.total_vehicles));
            assert!(s.active_incidents <= 5);
            assert!((80.0..=100.0).contains(&s.avg_signal_efficiency));
            assert_eq!(s.system_uptime, 99.9);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = EventGenerator::seeded(GeneratorConfig::default(), 42);
        let mut b = EventGenerator::seeded(GeneratorConfig::default(), 42);

        for _ in 0..50 {
            assert_eq!(a.tick(fixed_now()), b.tick(fixed_now()));
        }
    }

    #[test]
    fn test_every_class_is_produced() {
        let mut generator = EventGenerator::seeded(GeneratorConfig::default(), 3);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..500 {
            seen.insert(generator.next_detection(fixed_now()).vehicle_class);
        }

        assert_eq!(seen.len(), VehicleClass::ALL.len());
    }

    #[test]
    fn test_stats_probability_extremes() {
        let never = GeneratorConfig {
            stats_probability: 0.0,
            ..GeneratorConfig::default()
        };
        let always = GeneratorConfig {
            stats_probability: 1.0,
            ..GeneratorConfig::default()
        };
        let mut quiet = EventGenerator::seeded(never, 1);
        let mut chatty = EventGenerator::seeded(always, 1);

        for _ in 0..100 {
            let events = quiet.tick(fixed_now());
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].kind(), "detection");

            let events = chatty.tick(fixed_now());
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].kind(), "detection");
            assert_eq!(events[1].kind(), "stats_update");
        }
    }

    #[test]
    fn test_detection_carries_config_and_timestamp() {
        let config = GeneratorConfig {
            camera_id: "cam_042".to_string(),
            ..GeneratorConfig::default()
        };
        let mut generator = EventGenerator::seeded(config, 5);

        let events = generator.tick(fixed_now());

        assert_eq!(events[0].timestamp, "2024-01-15T14:32:00.000Z");
        match &events[0].payload {
            EventPayload::Detection(d) => {
                assert_eq!(d.camera_id, "cam_042");
                assert_eq!(d.location.intersection, "Intersection A1");
                assert_eq!(d.timestamp, events[0].timestamp);
            }
            other => panic!("expected detection, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_ten_detections_per_second() {
        let registry = BroadcastRegistry::new();
        let (conn, mut rx) = Connection::channel(256, None);
        registry.register(conn).unwrap();

        let generator = EventGenerator::seeded(GeneratorConfig::default(), 9);
        let handle = tokio::spawn(generator.run(registry.clone()));

        time::sleep(Duration::from_millis(1000)).await;
        handle.abort();

        let mut detections = 0;
        while let Ok(frame) = rx.try_recv() {
            let json: serde_json::Value = serde_json::from_str(&frame).unwrap();
            if json["type"] == "detection" {
                detections += 1;
            }
        }

        assert!((9..=11).contains(&detections), "got {} detections", detections);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_delivers_in_generation_order() {
        let registry = BroadcastRegistry::new();
        let (a, mut rx_a) = Connection::channel(256, None);
        let (b, mut rx_b) = Connection::channel(256, None);
        registry.register(a).unwrap();
        registry.register(b).unwrap();

        let config = GeneratorConfig {
            stats_probability: 0.5,
            ..GeneratorConfig::default()
        };
        let handle = tokio::spawn(EventGenerator::seeded(config, 21).run(registry.clone()));

        time::sleep(Duration::from_millis(550)).await;
        handle.abort();

        let mut frames_a = Vec::new();
        while let Ok(frame) = rx_a.try_recv() {
            frames_a.push(frame);
        }
        let mut frames_b = Vec::new();
        while let Ok(frame) = rx_b.try_recv() {
            frames_b.push(frame);
        }

        assert!(!frames_a.is_empty());
        assert_eq!(frames_a, frames_b);
    }

    #[test]
    fn test_validate_rejects_unusable_config() {
        let zero_tick = GeneratorConfig {
            tick_interval: Duration::ZERO,
            ..GeneratorConfig::default()
        };
        let nan_chance = GeneratorConfig {
            stats_probability: f64::NAN,
            ..GeneratorConfig::default()
        };
        let above_one = GeneratorConfig {
            stats_probability: 1.5,
            ..GeneratorConfig::default()
        };

        for config in [zero_tick, nan_chance, above_one] {
            assert!(matches!(config.validate(), Err(StreamError::InvalidConfig(_))));
        }
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tick_with_nan_probability_emits_detection_only() {
        let config = GeneratorConfig {
            stats_probability: f64::NAN,
            ..GeneratorConfig::default()
        };
        let mut generator = EventGenerator::seeded(config, 2);

        for _ in 0..20 {
            assert_eq!(generator.tick(fixed_now()).len(), 1);
        }
    }

    #[tokio::test]
    async fn test_spawn_generator_rejects_zero_tick() {
        let config = GeneratorConfig {
            tick_interval: Duration::ZERO,
            ..GeneratorConfig::default()
        };

        let result = spawn_generator(config, BroadcastRegistry::new(), Duration::from_millis(10));

        assert!(matches!(result, Err(StreamError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_run_with_invalid_config_returns_error() {
        let config = GeneratorConfig {
            tick_interval: Duration::ZERO,
            ..GeneratorConfig::default()
        };

        let result = EventGenerator::seeded(config, 1)
            .run(BroadcastRegistry::new())
            .await;

        assert!(matches!(result, Err(StreamError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervisor_restarts_after_fault() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let started = time::Instant::now();

        let counter = attempts.clone();
        supervise(Duration::from_secs(1), move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(StreamError::GeneratorFault(format!("attempt {}", attempt)))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervisor_gives_up_on_invalid_config() {
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = attempts.clone();
        supervise(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(StreamError::InvalidConfig("bad".to_string())) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervised_generator_keeps_streaming_after_fault() {
        let registry = BroadcastRegistry::new();
        let (conn, mut rx) = Connection::channel(256, None);
        registry.register(conn).unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let broadcast_to = registry.clone();
        let handle = tokio::spawn(supervise(Duration::from_millis(500), move || {
            let run = counter.fetch_add(1, Ordering::SeqCst);
            let registry = broadcast_to.clone();
            async move {
                if run == 0 {
                    return Err(StreamError::GeneratorFault("encoder broke".to_string()));
                }
                EventGenerator::seeded(GeneratorConfig::default(), 4)
                    .run(registry)
                    .await
            }
        }));

        time::sleep(Duration::from_millis(1000)).await;
        handle.abort();

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        let mut frames = 0;
        while rx.try_recv().is_ok() {
            frames += 1;
        }
        assert!(frames > 0, "restarted generator never broadcast");
        assert_eq!(registry.connection_count(), 1);
    }
}
