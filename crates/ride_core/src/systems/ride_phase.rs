//! Phase transitions of a ride simulation.
//!
//! Reacts to `PathCompleted` (end of the approach or of the ride) and
//! `DwellElapsed` (pickup pause over). The dwell timer is only armed once the
//! approach has completed, and the ride animation only starts when that exact
//! timer fires, so the second leg can never overlap the first.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};
use tracing::{debug, info};

use crate::animation::start_path_animation;
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{DriverMarker, RideSimulation};
use crate::phase::{PhaseTrigger, RidePhase};
use crate::render::RendererResource;
use crate::scenario::MotionConfig;
use crate::telemetry::RideTelemetry;

pub const PICKED_UP_POPUP: &str = "Picked you up!";
pub const RIDE_COMPLETE_POPUP: &str = "Ride complete";

#[allow(clippy::too_many_arguments)]
pub fn ride_phase_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    motion: Res<MotionConfig>,
    mut renderer: Option<ResMut<RendererResource>>,
    mut telemetry: Option<ResMut<RideTelemetry>>,
    mut rides: Query<(&mut RideSimulation, Option<&DriverMarker>)>,
) {
    let trigger = match event.0.kind {
        EventKind::PathCompleted => PhaseTrigger::PathCompleted,
        EventKind::DwellElapsed => PhaseTrigger::DwellElapsed,
        EventKind::AnimationTick => return,
    };
    let Some(entity) = event.0.subject else {
        return;
    };
    let Ok((mut ride, marker)) = rides.get_mut(entity) else {
        return;
    };
    if trigger == PhaseTrigger::DwellElapsed && ride.dwell_timer != Some(event.0.id) {
        return;
    }
    let Some(next) = ride.phase.transition(trigger) else {
        debug!(?entity, phase = ?ride.phase, ?trigger, "trigger ignored in current phase");
        return;
    };

    let now = clock.now();
    debug!(?entity, from = ?ride.phase, to = ?next, at_ms = now, "ride phase changed");
    ride.phase = next;
    if let Some(telemetry) = telemetry.as_mut() {
        telemetry.record_phase(entity, next, now);
    }

    let mut popup = |text: &str| {
        if let (Some(renderer), Some(marker)) = (renderer.as_mut(), marker) {
            renderer.0.bind_popup(marker.0, text);
        }
    };

    match next {
        RidePhase::Dwelling => {
            popup(PICKED_UP_POPUP);
            ride.dwell_timer = Some(clock.schedule_in(
                motion.dwell_ms,
                EventKind::DwellElapsed,
                Some(entity),
            ));
        }
        RidePhase::EnRouteToDrop => {
            ride.dwell_timer = None;
            let animation = start_path_animation(
                &mut clock,
                entity,
                &ride.route.points,
                motion.ride_speed_kmh,
                motion.frame_interval_ms,
            );
            if let Some(animation) = animation {
                commands.entity(entity).insert(animation);
            }
        }
        RidePhase::Complete => {
            ride.completed_at = Some(now);
            popup(RIDE_COMPLETE_POPUP);
            info!(
                ?entity,
                duration_ms = now.saturating_sub(ride.started_at),
                "ride complete"
            );
        }
        RidePhase::Idle | RidePhase::ApproachingPickup | RidePhase::Cancelled => {}
    }
}
