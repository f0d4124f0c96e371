//! Animation tick system: advances a path animation by the time elapsed since
//! its previous tick and mirrors the new position onto the entity's marker.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::animation::{AnimationStep, PathAnimation};
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{DriverMarker, GeoPosition};
use crate::render::RendererResource;
use crate::scenario::MotionConfig;
use crate::telemetry::RideTelemetry;

#[allow(clippy::too_many_arguments)]
pub fn animation_tick_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    motion: Res<MotionConfig>,
    mut renderer: Option<ResMut<RendererResource>>,
    mut telemetry: Option<ResMut<RideTelemetry>>,
    mut animated: Query<(
        &mut PathAnimation,
        Option<&mut GeoPosition>,
        Option<&DriverMarker>,
    )>,
) {
    if event.0.kind != EventKind::AnimationTick {
        return;
    }
    let Some(entity) = event.0.subject else {
        return;
    };
    let Ok((mut animation, position, marker)) = animated.get_mut(entity) else {
        return;
    };
    // A tick that is not the one the animation is waiting for belongs to an
    // earlier, replaced animation.
    if animation.pending_tick != Some(event.0.id) {
        return;
    }

    let now = clock.now();
    let step = animation.advance(now);
    let point = step.position();

    if let Some(mut position) = position {
        position.0 = point;
    }
    if let (Some(renderer), Some(marker)) = (renderer.as_mut(), marker) {
        renderer.0.move_marker(marker.0, point);
    }
    if let Some(telemetry) = telemetry.as_mut() {
        telemetry.ticks += 1;
    }

    match step {
        AnimationStep::Moved(_) => {
            animation.pending_tick = Some(clock.schedule_in(
                motion.frame_interval_ms.max(1),
                EventKind::AnimationTick,
                Some(entity),
            ));
        }
        AnimationStep::Finished(_) => {
            animation.pending_tick = None;
            commands.entity(entity).remove::<PathAnimation>();
            clock.schedule_at(now, EventKind::PathCompleted, Some(entity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::start_path_animation;
    use crate::clock::Event;
    use crate::geo::GeoPoint;
    use crate::render::{MarkerKind, MarkerRenderer, RecordingRenderer};
    use bevy_ecs::prelude::{Entity, Schedule, World};

    fn world_with_animation(path: &[GeoPoint]) -> (World, Entity, RecordingRenderer) {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(MotionConfig::default());
        let mut renderer = RecordingRenderer::new();
        let marker = renderer.place_marker(MarkerKind::Driver, path[0]);
        world.insert_resource(RendererResource(Box::new(renderer.clone())));

        let entity = world
            .spawn((GeoPosition(path[0]), DriverMarker(marker)))
            .id();
        let animation = {
            let mut clock = world.resource_mut::<SimulationClock>();
            start_path_animation(&mut clock, entity, path, 60.0, 16)
        }
        .expect("animation");
        world.entity_mut(entity).insert(animation);
        (world, entity, renderer)
    }

    fn run_event(world: &mut World, schedule: &mut Schedule) -> Option<Event> {
        let event = world.resource_mut::<SimulationClock>().pop_next()?;
        world.insert_resource(CurrentEvent(event));
        schedule.run(world);
        Some(event)
    }

    #[test]
    fn tick_moves_marker_and_schedules_next_tick() {
        let path = [GeoPoint::new(17.3850, 78.4867), GeoPoint::new(17.3950, 78.4867)];
        let (mut world, entity, renderer) = world_with_animation(&path);
        let mut schedule = Schedule::default();
        schedule.add_systems(animation_tick_system);

        let event = run_event(&mut world, &mut schedule).expect("tick");
        assert_eq!(event.kind, EventKind::AnimationTick);

        let position = world.get::<GeoPosition>(entity).expect("position").0;
        assert!(position.lat > path[0].lat && position.lat < path[1].lat);
        assert_eq!(position.lng, path[0].lng);

        let log = renderer.log();
        let marker = log.markers_of(MarkerKind::Driver)[0];
        assert_eq!(log.position(marker), Some(position));

        let clock = world.resource::<SimulationClock>();
        assert_eq!(clock.next_event_time(), Some(32));
    }

    #[test]
    fn final_tick_snaps_to_end_and_reports_completion() {
        let path = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.0001)];
        let (mut world, entity, renderer) = world_with_animation(&path);
        let mut schedule = Schedule::default();
        schedule.add_systems(animation_tick_system);

        let mut completion = None;
        for _ in 0..10_000 {
            let Some(event) = run_event(&mut world, &mut schedule) else {
                break;
            };
            if event.kind == EventKind::PathCompleted {
                completion = Some(event);
                break;
            }
        }
        let completion = completion.expect("path completed");
        assert_eq!(completion.subject, Some(entity));
        assert!(world.get::<PathAnimation>(entity).is_none());
        assert_eq!(world.get::<GeoPosition>(entity).expect("position").0, path[1]);

        let log = renderer.log();
        let marker = log.markers_of(MarkerKind::Driver)[0];
        assert_eq!(log.moves_for(marker).last(), Some(&path[1]));
    }

    #[test]
    fn stale_tick_is_ignored() {
        let path = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01)];
        let (mut world, entity, renderer) = world_with_animation(&path);
        let mut schedule = Schedule::default();
        schedule.add_systems(animation_tick_system);

        // A leftover tick from an older animation of the same entity.
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(1, EventKind::AnimationTick, Some(entity));
        run_event(&mut world, &mut schedule).expect("stale tick");

        assert_eq!(world.get::<GeoPosition>(entity).expect("position").0, path[0]);
        assert!(renderer.log().commands().len() == 1, "only the initial placement");
    }
}
