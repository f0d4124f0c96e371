mod support;

use bevy_ecs::prelude::{Entity, World};

use ride_core::animation::{cancel_path_animation, start_path_animation, AnimationStep, PathAnimation};
use ride_core::clock::{EventKind, SimulationClock};
use ride_core::ecs::{DriverMarker, GeoPosition};
use ride_core::geo::{path_length_m, GeoPoint};
use ride_core::render::{MarkerKind, MarkerRenderer, RecordingRenderer, RendererResource};
use ride_core::runner::{
    run_next_event_with_hook, run_until_empty, run_until_time, simulation_schedule,
};
use ride_core::scenario::MotionConfig;
use ride_core::telemetry::RideTelemetry;

use support::MAX_STEPS;

fn zigzag() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(17.3850, 78.4867),
        GeoPoint::new(17.3870, 78.4867),
        GeoPoint::new(17.3870, 78.4890),
        GeoPoint::new(17.3900, 78.4890),
        GeoPoint::new(17.3900, 78.4930),
    ]
}

/// World with only the animation machinery, one driver entity and its marker.
fn animator_world(path: &[GeoPoint]) -> (World, Entity, RecordingRenderer) {
    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    world.insert_resource(MotionConfig::default());
    world.insert_resource(RideTelemetry::default());

    let mut renderer = RecordingRenderer::new();
    let marker = renderer.place_marker(MarkerKind::Driver, path[0]);
    world.insert_resource(RendererResource(Box::new(renderer.clone())));

    let entity = world
        .spawn((GeoPosition(path[0]), DriverMarker(marker)))
        .id();
    let animation = {
        let mut clock = world.resource_mut::<SimulationClock>();
        start_path_animation(&mut clock, entity, path, 60.0, 16)
    };
    if let Some(animation) = animation {
        world.entity_mut(entity).insert(animation);
    }
    (world, entity, renderer)
}

#[test]
fn marker_visits_every_segment_and_ends_on_last_point() {
    let path = zigzag();
    let (mut world, entity, renderer) = animator_world(&path);
    let mut schedule = simulation_schedule();

    run_until_empty(&mut world, &mut schedule, MAX_STEPS);

    assert!(world.get::<PathAnimation>(entity).is_none());
    assert_eq!(world.get::<GeoPosition>(entity).map(|p| p.0), path.last().copied());

    let log = renderer.log();
    let marker = log.markers_of(MarkerKind::Driver)[0];
    let moves = log.moves_for(marker);
    assert_eq!(moves.last(), path.last());
    assert!(world.resource::<RideTelemetry>().ticks as usize >= moves.len());

    // First frame is near the start, last one on the end.
    let end = path[path.len() - 1];
    let first = moves[0].distance_m(end);
    let last = moves[moves.len() - 1].distance_m(end);
    assert!(first > last);
}

#[test]
fn completion_time_matches_length_over_speed() {
    let path = zigzag();
    let (mut world, entity, _renderer) = animator_world(&path);
    let mut schedule = simulation_schedule();
    let expected_ms = path_length_m(&path) / (60.0 * 1000.0 / 3600.0) * 1000.0;

    // Nothing finishes a frame early.
    let early = (expected_ms as u64).saturating_sub(16);
    run_until_time(&mut world, &mut schedule, early);
    assert!(world.get::<PathAnimation>(entity).is_some());

    run_until_empty(&mut world, &mut schedule, MAX_STEPS);
    let finished_at = world.resource::<SimulationClock>().now() as f64;
    assert!(finished_at >= expected_ms);
    assert!(finished_at < expected_ms + 16.0);
}

#[test]
fn completion_event_fires_once() {
    let path = zigzag();
    let (mut world, entity, _renderer) = animator_world(&path);
    let mut schedule = simulation_schedule();

    let mut completions = 0;
    let mut steps = 0;
    while steps < MAX_STEPS
        && run_next_event_with_hook(&mut world, &mut schedule, |_, event| {
            if event.kind == EventKind::PathCompleted && event.subject == Some(entity) {
                completions += 1;
            }
        })
    {
        steps += 1;
    }
    assert_eq!(completions, 1);
}

#[test]
fn cancelled_animation_stops_in_place() {
    let path = zigzag();
    let (mut world, entity, renderer) = animator_world(&path);
    let mut schedule = simulation_schedule();

    run_until_time(&mut world, &mut schedule, 1_000);
    let position = world.get::<GeoPosition>(entity).map(|p| p.0);
    let moves_before = {
        let log = renderer.log();
        let marker = log.markers_of(MarkerKind::Driver)[0];
        log.moves_for(marker).len()
    };

    assert!(cancel_path_animation(&mut world, entity));
    assert!(world.resource::<SimulationClock>().is_empty());
    assert_eq!(run_until_empty(&mut world, &mut schedule, MAX_STEPS), 0);

    assert_eq!(world.get::<GeoPosition>(entity).map(|p| p.0), position);
    let log = renderer.log();
    let marker = log.markers_of(MarkerKind::Driver)[0];
    assert_eq!(log.moves_for(marker).len(), moves_before);
    drop(log);
    assert!(!cancel_path_animation(&mut world, entity));
}

#[test]
fn duplicate_points_do_not_stall_the_animation() {
    let a = GeoPoint::new(17.3850, 78.4867);
    let b = GeoPoint::new(17.3900, 78.4867);
    let path = vec![a, a, b, b];
    let (mut world, entity, _renderer) = animator_world(&path);
    let mut schedule = simulation_schedule();

    run_until_empty(&mut world, &mut schedule, MAX_STEPS);
    assert_eq!(world.get::<GeoPosition>(entity).map(|p| p.0), Some(b));
}

#[test]
fn single_point_path_completes_without_ticks() {
    let only = GeoPoint::new(17.3850, 78.4867);
    let (mut world, entity, renderer) = animator_world(&[only]);
    let mut schedule = simulation_schedule();

    assert!(world.get::<PathAnimation>(entity).is_none());
    assert_eq!(world.resource::<SimulationClock>().len(), 1);
    run_until_empty(&mut world, &mut schedule, MAX_STEPS);

    assert_eq!(world.resource::<SimulationClock>().now(), 0);
    let log = renderer.log();
    let marker = log.markers_of(MarkerKind::Driver)[0];
    assert!(log.moves_for(marker).is_empty());
}

#[test]
fn large_jump_consumes_several_segments_at_once() {
    let path = zigzag();
    let mut animation = PathAnimation::new(&path, 60.0, 0).expect("animation");
    let total_ms = animation.expected_duration_ms();

    let step = animation.advance((total_ms * 0.8) as u64);
    assert!(matches!(step, AnimationStep::Moved(_)));
    assert!(animation.segment_index() >= 2);

    let step = animation.advance(total_ms as u64 + 1);
    assert_eq!(step, AnimationStep::Finished(path[path.len() - 1]));
    assert_eq!(animation.progress_m(), animation.total_m());
}
