//! Path animation: moves a point along a polyline at constant speed.
//!
//! [`PathAnimation`] is the per-entity animation state. Each `AnimationTick`
//! calls [`PathAnimation::advance`] with the clock time; the animation converts
//! the elapsed time into metres, consumes as many whole segments as that
//! distance covers, and interpolates inside the segment it lands in. Once the
//! path is exhausted the position snaps to the final point.
//!
//! Speeds are given in km/h and converted with `* 1000 / 3600`.

use bevy_ecs::prelude::{Component, Entity, World};
use tracing::debug;

use crate::clock::{EventId, EventKind, SimulationClock};
use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PathSegment {
    from: GeoPoint,
    to: GeoPoint,
    length_m: f64,
}

/// Outcome of one animation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationStep {
    /// Still travelling; the marker belongs here.
    Moved(GeoPoint),
    /// Path exhausted; this is exactly the last point.
    Finished(GeoPoint),
}

impl AnimationStep {
    pub fn position(self) -> GeoPoint {
        match self {
            AnimationStep::Moved(p) | AnimationStep::Finished(p) => p,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, AnimationStep::Finished(_))
    }
}

#[derive(Debug, Clone, Component)]
pub struct PathAnimation {
    segments: Vec<PathSegment>,
    /// Distance from the path start to the beginning of each segment.
    cumulative_m: Vec<f64>,
    total_m: f64,
    end: GeoPoint,
    segment_index: usize,
    meters_into_segment: f64,
    speed_mps: f64,
    last_tick_ms: u64,
    /// Token of the next scheduled tick, if any.
    pub pending_tick: Option<EventId>,
}

impl PathAnimation {
    /// Returns `None` when `path` has fewer than two points.
    pub fn new(path: &[GeoPoint], speed_kmh: f64, started_at_ms: u64) -> Option<Self> {
        if path.len() < 2 {
            return None;
        }
        let mut segments = Vec::with_capacity(path.len() - 1);
        let mut cumulative_m = Vec::with_capacity(path.len() - 1);
        let mut total_m = 0.0;
        for pair in path.windows(2) {
            let length_m = pair[0].distance_m(pair[1]);
            cumulative_m.push(total_m);
            segments.push(PathSegment {
                from: pair[0],
                to: pair[1],
                length_m,
            });
            total_m += length_m;
        }
        Some(Self {
            segments,
            cumulative_m,
            total_m,
            end: path[path.len() - 1],
            segment_index: 0,
            meters_into_segment: 0.0,
            speed_mps: speed_kmh * 1000.0 / 3600.0,
            last_tick_ms: started_at_ms,
            pending_tick: None,
        })
    }

    pub fn advance(&mut self, now_ms: u64) -> AnimationStep {
        let elapsed_secs = now_ms.saturating_sub(self.last_tick_ms) as f64 / 1000.0;
        self.last_tick_ms = self.last_tick_ms.max(now_ms);
        self.meters_into_segment += self.speed_mps * elapsed_secs;

        while self.segment_index < self.segments.len()
            && self.meters_into_segment > self.segments[self.segment_index].length_m
        {
            self.meters_into_segment -= self.segments[self.segment_index].length_m;
            self.segment_index += 1;
        }

        if self.is_finished() {
            self.meters_into_segment = 0.0;
            return AnimationStep::Finished(self.end);
        }

        let segment = &self.segments[self.segment_index];
        let ratio = if segment.length_m == 0.0 {
            0.0
        } else {
            self.meters_into_segment / segment.length_m
        };
        AnimationStep::Moved(segment.from.lerp(segment.to, ratio))
    }

    pub fn is_finished(&self) -> bool {
        self.segment_index >= self.segments.len()
    }

    /// Distance covered so far, never more than [`Self::total_m`].
    pub fn progress_m(&self) -> f64 {
        if self.is_finished() {
            return self.total_m;
        }
        (self.cumulative_m[self.segment_index] + self.meters_into_segment).min(self.total_m)
    }

    pub fn total_m(&self) -> f64 {
        self.total_m
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    /// Time needed to cover the whole path, in milliseconds.
    pub fn expected_duration_ms(&self) -> f64 {
        if self.speed_mps <= 0.0 {
            return f64::INFINITY;
        }
        self.total_m / self.speed_mps * 1000.0
    }
}

/// Start animating `entity` along `path`.
///
/// Schedules the first tick one frame from now and returns the animation to be
/// attached to the entity. A path with fewer than two points completes at once:
/// a `PathCompleted` event is scheduled for the current time and `None` is
/// returned, so no position is ever emitted for it.
pub fn start_path_animation(
    clock: &mut SimulationClock,
    entity: Entity,
    path: &[GeoPoint],
    speed_kmh: f64,
    frame_interval_ms: u64,
) -> Option<PathAnimation> {
    let now = clock.now();
    match PathAnimation::new(path, speed_kmh, now) {
        Some(mut animation) => {
            debug!(
                ?entity,
                points = path.len(),
                total_m = animation.total_m(),
                speed_kmh,
                "path animation started"
            );
            animation.pending_tick = Some(clock.schedule_in(
                frame_interval_ms.max(1),
                EventKind::AnimationTick,
                Some(entity),
            ));
            Some(animation)
        }
        None => {
            debug!(?entity, points = path.len(), "path too short, completing immediately");
            clock.schedule_at(now, EventKind::PathCompleted, Some(entity));
            None
        }
    }
}

/// Stop an entity's animation: the pending tick is withdrawn and the state
/// dropped. No completion is reported. Returns `false` if nothing was running.
pub fn cancel_path_animation(world: &mut World, entity: Entity) -> bool {
    let Some(animation) = world
        .get_entity_mut(entity)
        .and_then(|mut e| e.take::<PathAnimation>())
    else {
        return false;
    };
    if let Some(tick) = animation.pending_tick {
        world.resource_mut::<SimulationClock>().cancel(tick);
    }
    debug!(?entity, progress_m = animation.progress_m(), "path animation cancelled");
    true
}
