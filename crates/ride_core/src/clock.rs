//! Discrete-event clock driving animation ticks and timers.
//!
//! Time is in milliseconds since the session started. Events with equal
//! timestamps pop in the order they were scheduled. Every scheduled event gets
//! an [`EventId`] that can later be passed to [`SimulationClock::cancel`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

pub const ONE_SEC_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Advance the path animation of the subject.
    AnimationTick,
    /// The subject's current path has been exhausted.
    PathCompleted,
    /// The pickup dwell delay of the subject has elapsed.
    DwellElapsed,
}

/// Cancellation token for a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<Entity>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, id).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_id: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(
        &mut self,
        timestamp: u64,
        kind: EventKind,
        subject: Option<Entity>,
    ) -> EventId {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(Event {
            id,
            timestamp: timestamp.max(self.now),
            kind,
            subject,
        });
        id
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<Entity>) -> EventId {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, subject)
    }

    pub fn schedule_in_secs(
        &mut self,
        delay_secs: u64,
        kind: EventKind,
        subject: Option<Entity>,
    ) -> EventId {
        self.schedule_in(delay_secs.saturating_mul(ONE_SEC_MS), kind, subject)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|e| e.timestamp)
    }

    /// Move time forward without processing anything. Never moves backwards
    /// or past a pending event.
    pub fn advance_to(&mut self, timestamp: u64) {
        let limit = self.next_event_time().unwrap_or(u64::MAX);
        self.now = self.now.max(timestamp.min(limit));
    }

    /// Remove a pending event. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: EventId) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }

    /// Remove every pending event addressed to `subject`. Returns how many were removed.
    pub fn cancel_subject(&mut self, subject: Entity) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.subject != Some(subject));
        before - self.events.len()
    }

    pub fn has_pending_for(&self, subject: Entity) -> bool {
        self.events.iter().any(|e| e.subject == Some(subject))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
