use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{ConnectionId, Point, StrokeRecord};

/// Accumulates in-progress strokes server-side as point events arrive.
///
/// Strokes are keyed by the originating connection, so two users
/// drawing at the same time never interleave into one path. Nothing
/// here is part of committed history until the stroke is taken.
#[derive(Debug, Default)]
pub struct StrokeAssembler {
    open: HashMap<ConnectionId, StrokeRecord>,
}

impl StrokeAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a stroke for `from`. An earlier stroke of the same
    /// connection that was never finalized is silently replaced.
    pub fn begin(
        &mut self,
        from: ConnectionId,
        first: Point,
        color: String,
        width: f32,
        erasing: bool,
    ) {
        let stroke = StrokeRecord {
            path: vec![first],
            color,
            width,
            erasing,
            created_at: unix_millis(),
        };
        if self.open.insert(from, stroke).is_some() {
            log::debug!("connection {} reopened a stroke before finishing one", from);
        }
    }

    /// Appends to `from`'s open stroke; no-op when none is open.
    pub fn append(&mut self, from: ConnectionId, point: Point) {
        if let Some(stroke) = self.open.get_mut(&from) {
            stroke.path.push(point);
        }
    }

    /// Removes and returns `from`'s open stroke, if any.
    pub fn take(&mut self, from: ConnectionId) -> Option<StrokeRecord> {
        self.open.remove(&from)
    }

    pub fn discard(&mut self, from: ConnectionId) {
        self.open.remove(&from);
    }

    pub fn reset(&mut self) {
        self.open.clear();
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
