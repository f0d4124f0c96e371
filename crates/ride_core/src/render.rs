//! Rendering seam: where markers go when the session moves them.
//!
//! The session never draws anything itself. It places, moves and removes
//! markers through a [`MarkerRenderer`] stored as an ECS resource, so a map
//! widget, a terminal printer or a test recorder can sit behind it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Pickup,
    Drop,
    Driver,
}

pub trait MarkerRenderer: Send + Sync {
    fn place_marker(&mut self, kind: MarkerKind, at: GeoPoint) -> MarkerId;

    fn move_marker(&mut self, id: MarkerId, to: GeoPoint);

    fn remove_marker(&mut self, id: MarkerId);

    /// Attach a short label to a marker ("Picked you up!").
    fn bind_popup(&mut self, _id: MarkerId, _text: &str) {}
}

/// ECS resource wrapping a boxed renderer.
#[derive(Resource)]
pub struct RendererResource(pub Box<dyn MarkerRenderer>);

/// One call made against a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerCommand {
    Place {
        id: MarkerId,
        kind: MarkerKind,
        at: GeoPoint,
    },
    Move {
        id: MarkerId,
        to: GeoPoint,
    },
    Remove {
        id: MarkerId,
    },
    Popup {
        id: MarkerId,
        text: String,
    },
}

#[derive(Debug, Default)]
pub struct MarkerLog {
    next_id: u64,
    markers: HashMap<MarkerId, (MarkerKind, GeoPoint)>,
    commands: Vec<MarkerCommand>,
}

impl MarkerLog {
    pub fn commands(&self) -> &[MarkerCommand] {
        &self.commands
    }

    /// Current position of a live marker.
    pub fn position(&self, id: MarkerId) -> Option<GeoPoint> {
        self.markers.get(&id).map(|(_, at)| *at)
    }

    /// Live markers of the given kind.
    pub fn markers_of(&self, kind: MarkerKind) -> Vec<MarkerId> {
        let mut ids: Vec<MarkerId> = self
            .markers
            .iter()
            .filter(|(_, (k, _))| *k == kind)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn live_count(&self) -> usize {
        self.markers.len()
    }

    /// Every position a marker was moved to, in order.
    pub fn moves_for(&self, id: MarkerId) -> Vec<GeoPoint> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                MarkerCommand::Move { id: moved, to } if *moved == id => Some(*to),
                _ => None,
            })
            .collect()
    }

    pub fn popups_for(&self, id: MarkerId) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                MarkerCommand::Popup { id: target, text } if *target == id => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

/// Renderer that keeps markers in memory and records every call.
///
/// Clones share the same log, so a handle kept outside the world can inspect
/// what the systems did.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<MarkerLog>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, MarkerLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MarkerRenderer for RecordingRenderer {
    fn place_marker(&mut self, kind: MarkerKind, at: GeoPoint) -> MarkerId {
        let mut log = self.log();
        let id = MarkerId(log.next_id);
        log.next_id += 1;
        log.markers.insert(id, (kind, at));
        log.commands.push(MarkerCommand::Place { id, kind, at });
        id
    }

    fn move_marker(&mut self, id: MarkerId, to: GeoPoint) {
        let mut log = self.log();
        if let Some(entry) = log.markers.get_mut(&id) {
            entry.1 = to;
        }
        log.commands.push(MarkerCommand::Move { id, to });
    }

    fn remove_marker(&mut self, id: MarkerId) {
        let mut log = self.log();
        log.markers.remove(&id);
        log.commands.push(MarkerCommand::Remove { id });
    }

    fn bind_popup(&mut self, id: MarkerId, text: &str) {
        self.log().commands.push(MarkerCommand::Popup {
            id,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_renderer_tracks_live_markers() {
        let mut renderer = RecordingRenderer::new();
        let handle = renderer.clone();

        let pickup = renderer.place_marker(MarkerKind::Pickup, GeoPoint::new(1.0, 1.0));
        let driver = renderer.place_marker(MarkerKind::Driver, GeoPoint::new(2.0, 2.0));
        renderer.move_marker(driver, GeoPoint::new(2.5, 2.5));
        renderer.bind_popup(driver, "Driver (bike)");
        renderer.remove_marker(pickup);

        let log = handle.log();
        assert_eq!(log.live_count(), 1);
        assert_eq!(log.position(driver), Some(GeoPoint::new(2.5, 2.5)));
        assert_eq!(log.position(pickup), None);
        assert_eq!(log.moves_for(driver), vec![GeoPoint::new(2.5, 2.5)]);
        assert_eq!(log.popups_for(driver), vec!["Driver (bike)".to_string()]);
        assert_eq!(log.markers_of(MarkerKind::Driver), vec![driver]);
        assert_eq!(log.commands().len(), 5);
    }
}
