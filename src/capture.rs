//! Capture state machine driven by operator triggers
//!
//! [`CaptureState`] holds the most recent live snapshot, two optional marker
//! slots and the map id recorded at the last capture. Trigger events mutate
//! it and may yield a computed [`Marker`].
//!
//! The state is a plain owned object; callers serialize snapshot replacement
//! and trigger application (the connection layer does this with a single
//! dispatch task) so a trigger always observes a position/map pair from one
//! poll cycle.

use glam::Vec2;
use tracing::{debug, info};

use crate::geometry;
use crate::types::{
    CIRCLE_MARKER_NAME, CircleMarker, LINE_MARKER_NAME, Marker, PolygonMarker, Snapshot,
};

/// Marker slot selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

/// Operator trigger actions delivered by the external event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Capture the live position into a marker slot.
    Capture(Slot),
    /// Emit a thick-line polygon between the two captured positions.
    Line,
    /// Emit a fixed-radius circle at the live position.
    CircleAtPoint,
    /// Emit a circle sized by the captured pair, centered at the live position.
    CircleByDiameter,
}

/// Live snapshot, marker map and the two capture slots.
#[derive(Debug, Default)]
pub struct CaptureState {
    snapshot: Snapshot,
    marker_map: u32,
    slots: [Option<Vec2>; 2],
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live snapshot wholesale (no partial update).
    pub fn observe(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    /// The most recently observed snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Store the live position in a slot and record the live map id.
    ///
    /// A no-op until telemetry arrives; there is no position to capture while
    /// `tick == 0`.
    pub fn capture(&mut self, slot: Slot) {
        if !self.snapshot.is_live() {
            debug!(?slot, "Ignoring capture before telemetry is live");
            return;
        }

        let position = self.snapshot.position;
        self.slots[slot.index()] = Some(position);
        self.marker_map = self.snapshot.map_id;

        info!(
            ?slot,
            x = position.x,
            y = position.y,
            map_id = self.marker_map,
            "Captured marker position"
        );
    }

    /// Empty both slots.
    pub fn clear_slots(&mut self) {
        self.slots = [None, None];
    }

    /// True iff both slots hold distinct positions.
    ///
    /// A coincident pair is a degenerate zero-length capture and counts as
    /// not usable.
    pub fn both_slots_set(&self) -> bool {
        self.usable_pair().is_some()
    }

    fn usable_pair(&self) -> Option<(Vec2, Vec2)> {
        match (self.slots[0], self.slots[1]) {
            (Some(p0), Some(p1)) if p0 != p1 => Some((p0, p1)),
            _ => None,
        }
    }

    /// Apply a trigger, returning the computed marker if one was produced.
    ///
    /// Degenerate captures (missing or coincident slots) and triggers fired
    /// before telemetry is live are silently skipped. Both slots clear
    /// together after a successful line or diameter computation; the
    /// point-circle never touches them.
    pub fn apply(&mut self, trigger: Trigger) -> Option<Marker> {
        match trigger {
            Trigger::Capture(slot) => {
                self.capture(slot);
                None
            }
            Trigger::Line => {
                let Some((p0, p1)) = self.usable_pair() else {
                    debug!("Ignoring line trigger without two distinct captures");
                    return None;
                };
                let points = geometry::line_quad(p0, p1)?;
                self.clear_slots();

                Some(Marker::Polygon(PolygonMarker {
                    map_id: self.marker_map,
                    name: LINE_MARKER_NAME.to_string(),
                    points: points.to_vec(),
                }))
            }
            Trigger::CircleAtPoint => {
                if !self.snapshot.is_live() {
                    debug!("Ignoring circle trigger before telemetry is live");
                    return None;
                }

                Some(Marker::Circle(CircleMarker {
                    map_id: self.marker_map,
                    name: CIRCLE_MARKER_NAME.to_string(),
                    center: self.snapshot.position,
                    radius: geometry::POINT_CIRCLE_RADIUS,
                }))
            }
            Trigger::CircleByDiameter => {
                let Some((p0, p1)) = self.usable_pair() else {
                    debug!("Ignoring diameter trigger without two distinct captures");
                    return None;
                };
                let radius = geometry::diameter_radius(p0, p1);
                self.clear_slots();

                // The captured pair sizes the circle; the center is wherever
                // the operator currently stands, not the pair midpoint.
                Some(Marker::Circle(CircleMarker {
                    map_id: self.marker_map,
                    name: CIRCLE_MARKER_NAME.to_string(),
                    center: self.snapshot.position,
                    radius,
                }))
            }
        }
    }
}
