use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Box the synthetic driver start is drawn from, relative to pickup.
///
/// Each axis gets `min_deg + U[0, 1) * span_deg` added, so the driver always
/// starts north-east of the pickup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartOffset {
    pub min_deg: f64,
    pub span_deg: f64,
}

impl Default for StartOffset {
    fn default() -> Self {
        Self {
            min_deg: 0.002,
            span_deg: 0.01,
        }
    }
}

#[derive(Resource)]
pub struct StartPointSampler {
    rng: StdRng,
    offset: StartOffset,
}

impl StartPointSampler {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_offset(seed, StartOffset::default())
    }

    pub fn with_offset(seed: Option<u64>, offset: StartOffset) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, offset }
    }

    pub fn sample(&mut self, pickup: GeoPoint) -> GeoPoint {
        let dlat = self.rng.gen::<f64>() * self.offset.span_deg + self.offset.min_deg;
        let dlng = self.rng.gen::<f64>() * self.offset.span_deg + self.offset.min_deg;
        pickup.offset(dlat, dlng)
    }
}
