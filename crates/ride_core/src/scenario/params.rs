use std::fs;
use std::path::Path;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::RideError;
use crate::pricing::FareConfig;
use crate::routing::RouteProviderKind;
use crate::start::StartOffset;

/// Driver speed while approaching the pickup, km/h.
const DEFAULT_PICKUP_SPEED_KMH: f64 = 80.0;

/// Driver speed with the rider on board, km/h.
const DEFAULT_RIDE_SPEED_KMH: f64 = 60.0;

/// Pause at the pickup before departing.
const DEFAULT_DWELL_MS: u64 = 1_500;

/// One display frame at 60 Hz, rounded.
const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Speeds and timers used by the animation and phase systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Resource)]
pub struct MotionConfig {
    pub pickup_speed_kmh: f64,
    pub ride_speed_kmh: f64,
    pub dwell_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pickup_speed_kmh: DEFAULT_PICKUP_SPEED_KMH,
            ride_speed_kmh: DEFAULT_RIDE_SPEED_KMH,
            dwell_ms: DEFAULT_DWELL_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

/// Simulation end time in milliseconds. When set, the runner stops processing
/// events once the next event would be at or after this timestamp.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTimeMs(pub u64);

/// Parameters for building a ride session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub pickup_speed_kmh: f64,
    pub ride_speed_kmh: f64,
    pub dwell_ms: u64,
    pub frame_interval_ms: u64,
    /// Seed for the synthetic driver start. `None` draws from entropy.
    pub seed: Option<u64>,
    pub start_offset: StartOffset,
    pub fare: FareConfig,
    /// Which routing backend to use. Defaults to H3Grid.
    pub route_provider_kind: RouteProviderKind,
    /// Optional simulation end time in ms.
    pub simulation_end_time_ms: Option<u64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        let motion = MotionConfig::default();
        Self {
            pickup_speed_kmh: motion.pickup_speed_kmh,
            ride_speed_kmh: motion.ride_speed_kmh,
            dwell_ms: motion.dwell_ms,
            frame_interval_ms: motion.frame_interval_ms,
            seed: None,
            start_offset: StartOffset::default(),
            fare: FareConfig::default(),
            route_provider_kind: RouteProviderKind::default(),
            simulation_end_time_ms: None,
        }
    }
}

impl ScenarioParams {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RideError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| RideError::Config(format!("{}: {err}", path.display())))?;
        let params: Self = serde_json::from_str(&raw)
            .map_err(|err| RideError::Config(format!("{}: {err}", path.display())))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), RideError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(RideError::Config(format!("{name} must be positive, got {v}")))
            }
        };
        positive("pickup_speed_kmh", self.pickup_speed_kmh)?;
        positive("ride_speed_kmh", self.ride_speed_kmh)?;
        positive("fare.average_speed_kmh", self.fare.average_speed_kmh)?;
        if self.frame_interval_ms == 0 {
            return Err(RideError::Config("frame_interval_ms must be at least 1".into()));
        }
        if !(self.fare.per_km_rate.is_finite() && self.fare.per_km_rate >= 0.0) {
            return Err(RideError::Config(format!(
                "fare.per_km_rate must be non-negative, got {}",
                self.fare.per_km_rate
            )));
        }
        if self.start_offset.min_deg < 0.0 || self.start_offset.span_deg < 0.0 {
            return Err(RideError::Config("start_offset must be non-negative".into()));
        }
        Ok(())
    }

    pub fn motion(&self) -> MotionConfig {
        MotionConfig {
            pickup_speed_kmh: self.pickup_speed_kmh,
            ride_speed_kmh: self.ride_speed_kmh,
            dwell_ms: self.dwell_ms,
            frame_interval_ms: self.frame_interval_ms,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set pickup-approach and on-trip speeds in km/h.
    pub fn with_speeds(mut self, pickup_speed_kmh: f64, ride_speed_kmh: f64) -> Self {
        self.pickup_speed_kmh = pickup_speed_kmh;
        self.ride_speed_kmh = ride_speed_kmh;
        self
    }

    pub fn with_dwell_ms(mut self, dwell_ms: u64) -> Self {
        self.dwell_ms = dwell_ms;
        self
    }

    pub fn with_frame_interval_ms(mut self, frame_interval_ms: u64) -> Self {
        self.frame_interval_ms = frame_interval_ms;
        self
    }

    pub fn with_start_offset(mut self, start_offset: StartOffset) -> Self {
        self.start_offset = start_offset;
        self
    }

    pub fn with_fare_config(mut self, fare: FareConfig) -> Self {
        self.fare = fare;
        self
    }

    pub fn with_route_provider(mut self, kind: RouteProviderKind) -> Self {
        self.route_provider_kind = kind;
        self
    }

    /// Set simulation end time in ms. Runner stops when the next event is at or after this time.
    pub fn with_simulation_end_time_ms(mut self, end_ms: u64) -> Self {
        self.simulation_end_time_ms = Some(end_ms);
        self
    }
}
