use bevy_ecs::prelude::Component;

use crate::clock::EventId;
use crate::geo::{GeoPoint, Route};
use crate::phase::RidePhase;
use crate::render::MarkerId;

/// Simulated driver running one ride: approach, dwell, then the booked route.
#[derive(Debug, Clone, Component)]
pub struct RideSimulation {
    pub phase: RidePhase,
    /// Synthetic point the driver sets off from.
    pub start: GeoPoint,
    pub pickup: GeoPoint,
    /// Booked route, pickup first.
    pub route: Route,
    /// Token of the pending dwell timer while `Dwelling`.
    pub dwell_timer: Option<EventId>,
    pub started_at: u64,
    pub completed_at: Option<u64>,
}

/// Last position emitted for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct GeoPosition(pub GeoPoint);

/// Map marker that mirrors the entity's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct DriverMarker(pub MarkerId);
