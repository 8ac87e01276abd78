//! Computed marker shapes

use glam::Vec2;

/// Name stamped on thick-line polygon markers.
pub const LINE_MARKER_NAME: &str = "Line Marker";

/// Name stamped on circle markers.
pub const CIRCLE_MARKER_NAME: &str = "Circle";

/// Polygon marker: an ordered point sequence on one map.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonMarker {
    pub map_id: u32,
    pub name: String,
    /// Ordered vertices; always at least 3 for a valid area.
    pub points: Vec<Vec2>,
}

/// Circle marker: a center and integer radius on one map.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleMarker {
    pub map_id: u32,
    pub name: String,
    pub center: Vec2,
    /// Radius in map-distance units.
    pub radius: u32,
}

/// A computed marker of either shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Polygon(PolygonMarker),
    Circle(CircleMarker),
}

impl Marker {
    /// Owning map id of the marker.
    pub fn map_id(&self) -> u32 {
        match self {
            Marker::Polygon(polygon) => polygon.map_id,
            Marker::Circle(circle) => circle.map_id,
        }
    }
}
