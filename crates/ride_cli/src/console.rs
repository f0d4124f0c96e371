//! Terminal stand-in for the map: markers become printed lines.

use std::io::Write;

use tracing::warn;

use ride_core::geo::GeoPoint;
use ride_core::render::{MarkerId, MarkerKind, MarkerRenderer};

/// Prints marker activity. Moves are frequent (one per frame), so only every
/// `move_every`-th one is printed.
pub struct ConsoleRenderer<W> {
    out: W,
    next_id: u64,
    move_every: u64,
    moves: u64,
    write_failed: bool,
}

impl<W: Write + Send + Sync> ConsoleRenderer<W> {
    pub fn new(out: W, move_every: u64) -> Self {
        Self {
            out,
            next_id: 0,
            move_every: move_every.max(1),
            moves: 0,
            write_failed: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{text}") {
            // Warn once, then keep dropping lines.
            if !self.write_failed {
                warn!(error = %err, "console output failed, marker lines are being dropped");
                self.write_failed = true;
            }
        }
    }
}

fn label(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::Pickup => "pickup",
        MarkerKind::Drop => "drop",
        MarkerKind::Driver => "driver",
    }
}

impl<W: Write + Send + Sync> MarkerRenderer for ConsoleRenderer<W> {
    fn place_marker(&mut self, kind: MarkerKind, at: GeoPoint) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.line(format_args!("[marker {}] {} at {at}", id.0, label(kind)));
        id
    }

    fn move_marker(&mut self, id: MarkerId, to: GeoPoint) {
        self.moves += 1;
        if self.moves % self.move_every == 0 {
            self.line(format_args!("[marker {}] -> {to}", id.0));
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.line(format_args!("[marker {}] removed", id.0));
    }

    fn bind_popup(&mut self, id: MarkerId, text: &str) {
        self.line(format_args!("[marker {}] \"{text}\"", id.0));
    }
}
