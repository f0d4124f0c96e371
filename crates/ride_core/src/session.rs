//! Ride session: the single owner of everything one map view works with.
//!
//! A [`RideSession`] holds the pickup/drop selection, the last route quote and
//! at most one running ride simulation, together with the ECS world and
//! schedule that animate it. Typical flow:
//!
//! 1. [`RideSession::select_point`] twice (pickup, then drop).
//! 2. [`RideSession::calculate_route`] to get distance, fare and ETA.
//! 3. [`RideSession::confirm_ride`] to start the simulated driver.
//! 4. Drive time forward with [`RideSession::advance_by`],
//!    [`RideSession::run_until_idle`] or [`RideSession::run_realtime`].

use std::fmt;

use bevy_ecs::prelude::{Entity, Schedule, World};
use tracing::{debug, info, warn};

use crate::animation::{cancel_path_animation, start_path_animation};
use crate::clock::SimulationClock;
use crate::ecs::{DriverMarker, GeoPosition, RideSimulation};
use crate::error::RideError;
use crate::geo::{GeoPoint, Route};
use crate::phase::{PhaseTrigger, RidePhase};
use crate::pricing::{FareConfig, FareEstimate};
use crate::render::{MarkerId, MarkerKind, MarkerRenderer, RendererResource};
use crate::routing::{RouteProvider, RouteProviderResource};
use crate::runner::{
    run_next_event, run_realtime, run_until_empty, run_until_time, simulation_schedule,
};
use crate::scenario::{build_world, MotionConfig, ScenarioParams};
use crate::start::StartPointSampler;
use crate::telemetry::RideTelemetry;

pub const DRIVER_POPUP: &str = "Driver";
pub const PICKUP_POPUP: &str = "Pickup";
pub const DROP_POPUP: &str = "Drop";

/// Route plus the fare and ETA derived from its distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuote {
    pub route: Route,
    pub estimate: FareEstimate,
    pub eta_minutes: u32,
}

/// Summary shown once a ride is confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct RideConfirmation {
    /// Upper-cased vehicle name.
    pub vehicle: String,
    pub estimate: FareEstimate,
    pub eta_minutes: u32,
    pub simulation: Entity,
}

impl fmt::Display for RideConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ride Confirmed")?;
        writeln!(f, "Vehicle: {}", self.vehicle)?;
        write!(
            f,
            "Distance: {} km • Fare: {} • ETA: {} min",
            self.estimate.km, self.estimate.fare, self.eta_minutes
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Waypoint {
    point: GeoPoint,
    marker: MarkerId,
}

pub struct RideSession {
    world: World,
    schedule: Schedule,
    pickup: Option<Waypoint>,
    drop: Option<Waypoint>,
    quote: Option<RouteQuote>,
    active: Option<Entity>,
}

impl RideSession {
    pub fn new(params: &ScenarioParams, renderer: Box<dyn MarkerRenderer>) -> Result<Self, RideError> {
        params.validate()?;
        let mut world = World::new();
        build_world(&mut world, params, renderer);
        Ok(Self {
            world,
            schedule: simulation_schedule(),
            pickup: None,
            drop: None,
            quote: None,
            active: None,
        })
    }

    /// Replace the routing backend chosen by the params.
    pub fn with_route_provider(mut self, provider: Box<dyn RouteProvider>) -> Self {
        self.world.insert_resource(RouteProviderResource(provider));
        self
    }

    // ----------------------------------------------------------------------
    // Waypoints
    // ----------------------------------------------------------------------

    /// Map click: the first click sets pickup, the second sets drop, later
    /// clicks move the drop. Returns which waypoint changed.
    pub fn select_point(&mut self, point: GeoPoint) -> MarkerKind {
        if self.pickup.is_none() {
            self.set_pickup(point);
            MarkerKind::Pickup
        } else {
            self.set_drop(point);
            MarkerKind::Drop
        }
    }

    pub fn set_pickup(&mut self, point: GeoPoint) {
        self.pickup = Some(self.place_or_move(self.pickup, MarkerKind::Pickup, point));
    }

    pub fn set_drop(&mut self, point: GeoPoint) {
        self.drop = Some(self.place_or_move(self.drop, MarkerKind::Drop, point));
    }

    pub fn pickup(&self) -> Option<GeoPoint> {
        self.pickup.map(|w| w.point)
    }

    pub fn drop_point(&self) -> Option<GeoPoint> {
        self.drop.map(|w| w.point)
    }

    fn place_or_move(&mut self, current: Option<Waypoint>, kind: MarkerKind, point: GeoPoint) -> Waypoint {
        // A moved waypoint makes the stored route stale.
        self.quote = None;
        let mut renderer = self.world.resource_mut::<RendererResource>();
        match current {
            Some(waypoint) => {
                renderer.0.move_marker(waypoint.marker, point);
                Waypoint {
                    point,
                    marker: waypoint.marker,
                }
            }
            None => {
                let marker = renderer.0.place_marker(kind, point);
                let label = match kind {
                    MarkerKind::Pickup => PICKUP_POPUP,
                    MarkerKind::Drop => DROP_POPUP,
                    MarkerKind::Driver => DRIVER_POPUP,
                };
                renderer.0.bind_popup(marker, label);
                Waypoint { point, marker }
            }
        }
    }

    // ----------------------------------------------------------------------
    // Quote and confirmation
    // ----------------------------------------------------------------------

    /// Route between the selected waypoints with fare and ETA.
    ///
    /// Any previous quote is discarded first, so on error no quote is held.
    pub fn calculate_route(&mut self) -> Result<&RouteQuote, RideError> {
        let (Some(pickup), Some(drop)) = (self.pickup, self.drop) else {
            return Err(RideError::MissingWaypoints);
        };
        self.quote = None;

        let route = self
            .world
            .resource::<RouteProviderResource>()
            .0
            .route(pickup.point, drop.point)
            .map_err(|err| {
                warn!(error = %err, from = %pickup.point, to = %drop.point, "routing failed");
                RideError::from(err)
            })?;

        let fare = *self.world.resource::<FareConfig>();
        let estimate = fare.compute_fare(route.distance_m);
        let eta_minutes = fare.compute_eta(route.distance_m);
        info!(
            km = %estimate.km,
            fare = estimate.fare,
            eta_minutes,
            points = route.points.len(),
            "route calculated"
        );
        Ok(self.quote.insert(RouteQuote {
            route,
            estimate,
            eta_minutes,
        }))
    }

    pub fn quote(&self) -> Option<&RouteQuote> {
        self.quote.as_ref()
    }

    /// Confirm the quoted ride and start the simulated driver. A simulation
    /// that is still running is cancelled first.
    pub fn confirm_ride(&mut self, vehicle: &str) -> Result<RideConfirmation, RideError> {
        let quote = self.quote.clone().ok_or(RideError::RouteNotCalculated)?;
        let simulation = self.start_simulation(quote.route)?;
        Ok(RideConfirmation {
            vehicle: vehicle.to_uppercase(),
            estimate: quote.estimate,
            eta_minutes: quote.eta_minutes,
            simulation,
        })
    }

    fn start_simulation(&mut self, route: Route) -> Result<Entity, RideError> {
        let pickup = route.start().ok_or(RideError::EmptyRoute)?;
        if self.cancel_simulation() {
            debug!("previous simulation replaced");
        }

        let start = self.world.resource_mut::<StartPointSampler>().sample(pickup);
        let marker = {
            let mut renderer = self.world.resource_mut::<RendererResource>();
            let marker = renderer.0.place_marker(MarkerKind::Driver, start);
            renderer.0.bind_popup(marker, DRIVER_POPUP);
            marker
        };
        let now = self.world.resource::<SimulationClock>().now();
        let phase = RidePhase::Idle
            .transition(PhaseTrigger::Start)
            .unwrap_or(RidePhase::ApproachingPickup);

        let entity = self
            .world
            .spawn((
                RideSimulation {
                    phase,
                    start,
                    pickup,
                    route,
                    dwell_timer: None,
                    started_at: now,
                    completed_at: None,
                },
                GeoPosition(start),
                DriverMarker(marker),
            ))
            .id();
        self.world
            .resource_mut::<RideTelemetry>()
            .record_phase(entity, phase, now);

        let motion = *self.world.resource::<MotionConfig>();
        let animation = {
            let mut clock = self.world.resource_mut::<SimulationClock>();
            start_path_animation(
                &mut clock,
                entity,
                &[start, pickup],
                motion.pickup_speed_kmh,
                motion.frame_interval_ms,
            )
        };
        if let Some(animation) = animation {
            self.world.entity_mut(entity).insert(animation);
        }

        info!(?entity, %start, %pickup, "driver simulation started");
        self.active = Some(entity);
        Ok(entity)
    }

    /// Stop the current simulation: pending ticks and timers are withdrawn, the
    /// driver marker removed. No completion fires afterwards. Returns `false`
    /// if there was nothing to cancel.
    pub fn cancel_simulation(&mut self) -> bool {
        let Some(entity) = self.active.take() else {
            return false;
        };
        cancel_path_animation(&mut self.world, entity);
        let withdrawn = self
            .world
            .resource_mut::<SimulationClock>()
            .cancel_subject(entity);

        let cancelled = self.world.get_mut::<RideSimulation>(entity).and_then(|mut ride| {
            let next = ride.phase.transition(PhaseTrigger::Cancel)?;
            ride.phase = next;
            Some(next)
        });
        if let Some(phase) = cancelled {
            let now = self.world.resource::<SimulationClock>().now();
            self.world
                .resource_mut::<RideTelemetry>()
                .record_phase(entity, phase, now);
        }

        if let Some(marker) = self.world.get::<DriverMarker>(entity).copied() {
            self.world
                .resource_mut::<RendererResource>()
                .0
                .remove_marker(marker.0);
        }
        self.world.despawn(entity);
        debug!(?entity, withdrawn, "simulation cancelled");
        true
    }

    /// Clear everything: simulation, waypoints, markers and quote.
    pub fn reset(&mut self) {
        self.cancel_simulation();
        let waypoints = [self.pickup.take(), self.drop.take()];
        let mut renderer = self.world.resource_mut::<RendererResource>();
        for waypoint in waypoints.into_iter().flatten() {
            renderer.0.remove_marker(waypoint.marker);
        }
        self.quote = None;
    }

    // ----------------------------------------------------------------------
    // Time
    // ----------------------------------------------------------------------

    /// Process the next pending event. Returns `false` when nothing is pending.
    pub fn step(&mut self) -> bool {
        run_next_event(&mut self.world, &mut self.schedule)
    }

    /// Run until no events remain or `max_steps` were processed.
    pub fn run_until_idle(&mut self, max_steps: usize) -> usize {
        run_until_empty(&mut self.world, &mut self.schedule, max_steps)
    }

    /// Advance simulated time by `delta_ms`, processing everything due.
    pub fn advance_by(&mut self, delta_ms: u64) -> usize {
        let until = self.now_ms().saturating_add(delta_ms);
        run_until_time(&mut self.world, &mut self.schedule, until)
    }

    /// Run with simulated time paced to the wall clock.
    pub fn run_realtime(&mut self, max_steps: usize) -> usize {
        run_realtime(&mut self.world, &mut self.schedule, max_steps)
    }

    // ----------------------------------------------------------------------
    // Inspection
    // ----------------------------------------------------------------------

    pub fn now_ms(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    /// Phase of the current simulation, `Idle` when none is running.
    pub fn phase(&self) -> RidePhase {
        self.active
            .and_then(|entity| self.world.get::<RideSimulation>(entity))
            .map(|ride| ride.phase)
            .unwrap_or(RidePhase::Idle)
    }

    pub fn active_simulation(&self) -> Option<Entity> {
        self.active
    }

    pub fn simulation(&self) -> Option<&RideSimulation> {
        self.active
            .and_then(|entity| self.world.get::<RideSimulation>(entity))
    }

    pub fn driver_position(&self) -> Option<GeoPoint> {
        self.active
            .and_then(|entity| self.world.get::<GeoPosition>(entity))
            .map(|p| p.0)
    }

    pub fn telemetry(&self) -> &RideTelemetry {
        self.world.resource::<RideTelemetry>()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.world.resource::<SimulationClock>().is_empty()
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}
