//! Fare and ETA estimation from route distance.
//!
//! Formula: `fare = max(minimum_fare, round(km * per_km_rate))` and
//! `eta_minutes = round(km / average_speed_kmh * 60)`. Fares are whole
//! currency units.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Per-kilometre rate in currency units.
pub const PER_KM_RATE: f64 = 7.0;

/// Fare floor applied to short trips.
pub const MINIMUM_FARE: u32 = 10;

/// Average speed assumed for ETA estimates.
pub const AVERAGE_SPEED_KMH: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct FareConfig {
    pub per_km_rate: f64,
    pub minimum_fare: u32,
    pub average_speed_kmh: f64,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            per_km_rate: PER_KM_RATE,
            minimum_fare: MINIMUM_FARE,
            average_speed_kmh: AVERAGE_SPEED_KMH,
        }
    }
}

/// Fare quote for a distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareEstimate {
    /// Input distance, echoed back.
    pub distance_meters: f64,
    /// Kilometres rendered with two decimals.
    pub km: String,
    pub fare: u32,
}

impl FareConfig {
    /// Callers must pass a non-negative, finite distance.
    pub fn compute_fare(&self, distance_meters: f64) -> FareEstimate {
        let km = distance_meters / 1000.0;
        let raw = (km * self.per_km_rate).round() as u32;
        FareEstimate {
            distance_meters,
            km: format_km(km),
            fare: raw.max(self.minimum_fare),
        }
    }

    /// ETA in whole minutes at the configured average speed.
    pub fn compute_eta(&self, distance_meters: f64) -> u32 {
        let km = distance_meters / 1000.0;
        let hours = km / self.average_speed_kmh;
        (hours * 60.0).round() as u32
    }
}

/// Two decimals, exact halves rounded up (`0.125` -> `"0.13"`).
///
/// `{:.2}` rounds exact halves to even. A double sits exactly halfway between
/// two cents only when `km * 8` is an odd integer, so those values are rounded
/// up by hand and everything else goes through `{:.2}`.
fn format_km(km: f64) -> String {
    let eighths = km.abs() * 8.0;
    let exact_half = eighths.fract() == 0.0 && eighths % 2.0 == 1.0;
    if !exact_half {
        return format!("{km:.2}");
    }
    let rounded = (km.abs() * 100.0).ceil() / 100.0;
    let sign = if km.is_sign_negative() { "-" } else { "" };
    format!("{sign}{rounded:.2}")
}

/// [`FareConfig::compute_fare`] with the default rates.
pub fn compute_fare(distance_meters: f64) -> FareEstimate {
    FareConfig::default().compute_fare(distance_meters)
}

/// [`FareConfig::compute_eta`] with the default average speed.
pub fn compute_eta(distance_meters: f64) -> u32 {
    FareConfig::default().compute_eta(distance_meters)
}
