//! Ride phase state machine.
//!
//! ```text
//! Idle --Start--> ApproachingPickup --PathCompleted--> Dwelling
//!      --DwellElapsed--> EnRouteToDrop --PathCompleted--> Complete
//! ```
//!
//! `Cancel` moves any non-terminal phase to `Cancelled`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RidePhase {
    Idle,
    ApproachingPickup,
    Dwelling,
    EnRouteToDrop,
    Complete,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTrigger {
    Start,
    PathCompleted,
    DwellElapsed,
    Cancel,
}

impl RidePhase {
    /// Next phase for `trigger`, or `None` if the trigger does not apply here.
    pub fn transition(self, trigger: PhaseTrigger) -> Option<RidePhase> {
        use PhaseTrigger as T;
        use RidePhase as P;
        match (self, trigger) {
            (P::Idle, T::Start) => Some(P::ApproachingPickup),
            (P::ApproachingPickup, T::PathCompleted) => Some(P::Dwelling),
            (P::Dwelling, T::DwellElapsed) => Some(P::EnRouteToDrop),
            (P::EnRouteToDrop, T::PathCompleted) => Some(P::Complete),
            (phase, T::Cancel) if !phase.is_terminal() => Some(P::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RidePhase::Complete | RidePhase::Cancelled)
    }

    /// Whether the driver marker is expected to be moving.
    pub fn is_animating(self) -> bool {
        matches!(self, RidePhase::ApproachingPickup | RidePhase::EnRouteToDrop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_walks_every_phase() {
        let mut phase = RidePhase::Idle;
        for (trigger, expected) in [
            (PhaseTrigger::Start, RidePhase::ApproachingPickup),
            (PhaseTrigger::PathCompleted, RidePhase::Dwelling),
            (PhaseTrigger::DwellElapsed, RidePhase::EnRouteToDrop),
            (PhaseTrigger::PathCompleted, RidePhase::Complete),
        ] {
            phase = phase.transition(trigger).expect("valid transition");
            assert_eq!(phase, expected);
        }
        assert!(phase.is_terminal());
    }

    #[test]
    fn out_of_order_triggers_are_rejected() {
        assert_eq!(RidePhase::Idle.transition(PhaseTrigger::PathCompleted), None);
        assert_eq!(RidePhase::ApproachingPickup.transition(PhaseTrigger::DwellElapsed), None);
        assert_eq!(RidePhase::Dwelling.transition(PhaseTrigger::PathCompleted), None);
        assert_eq!(RidePhase::Complete.transition(PhaseTrigger::Start), None);
    }

    #[test]
    fn cancel_only_from_live_phases() {
        assert_eq!(
            RidePhase::Dwelling.transition(PhaseTrigger::Cancel),
            Some(RidePhase::Cancelled)
        );
        assert_eq!(RidePhase::Complete.transition(PhaseTrigger::Cancel), None);
        assert_eq!(RidePhase::Cancelled.transition(PhaseTrigger::Cancel), None);
    }
}
