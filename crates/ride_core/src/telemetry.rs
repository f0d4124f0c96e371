//! Phase history and tick counters collected while a session runs.

use bevy_ecs::prelude::{Entity, Resource};

use crate::phase::RidePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRecord {
    pub entity: Entity,
    pub phase: RidePhase,
    pub at_ms: u64,
}

#[derive(Debug, Default, Resource)]
pub struct RideTelemetry {
    pub phases: Vec<PhaseRecord>,
    /// Animation ticks that produced a marker update.
    pub ticks: u64,
}

impl RideTelemetry {
    pub fn record_phase(&mut self, entity: Entity, phase: RidePhase, at_ms: u64) {
        self.phases.push(PhaseRecord {
            entity,
            phase,
            at_ms,
        });
    }

    /// Phases entered by `entity`, in order.
    pub fn phases_for(&self, entity: Entity) -> Vec<RidePhase> {
        self.phases
            .iter()
            .filter(|r| r.entity == entity)
            .map(|r| r.phase)
            .collect()
    }

    /// When `entity` first entered `phase`.
    pub fn entered_at(&self, entity: Entity, phase: RidePhase) -> Option<u64> {
        self.phases
            .iter()
            .find(|r| r.entity == entity && r.phase == phase)
            .map(|r| r.at_ms)
    }
}
