//! Planar telemetry snapshot

use glam::Vec2;

use crate::link::LinkData;

/// Planar telemetry snapshot consumed by the marker-geometry engine.
///
/// Produced fresh on every decode and replaced wholesale on every poll.
/// `tick == 0` means no valid telemetry has arrived yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    /// Monotonic frame counter from the link header.
    pub tick: u32,

    /// Avatar position projected onto the map plane.
    pub position: Vec2,

    /// Map id from the game context block.
    pub map_id: u32,
}

impl Snapshot {
    /// Create a snapshot from raw parts.
    pub fn new(tick: u32, position: Vec2, map_id: u32) -> Self {
        Self { tick, position, map_id }
    }

    /// Project decoded link telemetry onto the map plane.
    ///
    /// The vertical component (`y`) is dropped; all downstream geometry is
    /// planar over `(x, z)`.
    pub fn from_link(link: &LinkData) -> Self {
        Self {
            tick: link.ui_tick,
            position: Vec2::new(link.avatar_position.x, link.avatar_position.z),
            map_id: link.context.map_id,
        }
    }

    /// Whether the game has started writing telemetry.
    pub fn is_live(&self) -> bool {
        self.tick != 0
    }
}
