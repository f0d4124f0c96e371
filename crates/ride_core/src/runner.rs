//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule.

use std::thread;
use std::time::{Duration, Instant};

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::scenario::SimulationEndTimeMs;
use crate::systems::{animation_tick::animation_tick_system, ride_phase::ride_phase_system};

fn is_animation_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::AnimationTick)
        .unwrap_or(false)
}

fn is_phase_event(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::PathCompleted | EventKind::DwellElapsed))
        .unwrap_or(false)
}

/// Runs one simulation step. Returns `false` if the clock was empty or if the
/// next event is at or past [SimulationEndTimeMs] (when that resource is present).
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    run_next_event_with_hook(world, schedule, |_, _| {})
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let stop_at = world.get_resource::<SimulationEndTimeMs>().map(|e| e.0);
    let next_ts = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(end_ms), Some(ts)) = (stop_at, next_ts) {
        if ts >= end_ms {
            return false;
        }
    }

    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Processes every event due at or before `until_ms`, then moves the clock to
/// `until_ms` (or to the next pending event, whichever is earlier).
pub fn run_until_time(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> usize {
    let mut steps = 0;
    loop {
        let due = world
            .resource::<SimulationClock>()
            .next_event_time()
            .map(|ts| ts <= until_ms)
            .unwrap_or(false);
        if !due || !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    world.resource_mut::<SimulationClock>().advance_to(until_ms);
    steps
}

/// Like [run_until_empty], but sleeps so that simulated milliseconds track wall
/// clock milliseconds from the moment this is called.
pub fn run_realtime(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let wall_start = Instant::now();
    let sim_start = world.resource::<SimulationClock>().now();
    let mut steps = 0;
    while steps < max_steps {
        let Some(next_ts) = world.resource::<SimulationClock>().next_event_time() else {
            break;
        };
        let target = Duration::from_millis(next_ts.saturating_sub(sim_start));
        let elapsed = wall_start.elapsed();
        if target > elapsed {
            thread::sleep(target - elapsed);
        }
        if !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Builds the ride schedule: the animation tick and phase systems, each gated on
/// the current event kind, followed by [apply_deferred] so component changes are
/// visible to the next step.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            animation_tick_system.run_if(is_animation_tick),
            ride_phase_system.run_if(is_phase_event),
            apply_deferred,
        )
            .chain(),
    );
    schedule
}
