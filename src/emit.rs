//! Marker record formatting for overlay tooling
//!
//! Converts computed markers into the record shape downstream overlay tools
//! ingest. The field names and nesting (`Name`, `Area`, `AreaType`,
//! `Polygon`, `Center`, `Radius`) are load-bearing; overlay tools match on
//! them exactly.

use glam::Vec2;
use serde::Serialize;

use crate::types::{CircleMarker, Marker, PolygonMarker};

/// Delimiter framing the copy-paste block.
const SNIP: &str = "<==========================>";

/// Area payload in the overlay record schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "AreaType", rename_all = "lowercase")]
pub enum Area {
    Polygon {
        #[serde(rename = "Polygon")]
        polygon: Vec<Vec2>,
    },
    Circle {
        #[serde(rename = "Center")]
        center: Vec2,
        #[serde(rename = "Radius")]
        radius: u32,
    },
}

/// One emitted marker record.
///
/// The map id travels outside the JSON body (overlay area files are grouped
/// per map, so the body itself carries only name and area).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerRecord {
    #[serde(skip)]
    pub map_id: u32,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Area")]
    pub area: Area,
}

impl MarkerRecord {
    /// Render the record as the operator-facing copy-paste block:
    /// a `MapId:` line, then the JSON body between snip delimiters, with a
    /// trailing comma so the body pastes directly into an area list.
    pub fn render(&self) -> String {
        let body = serde_json::to_string_pretty(self)
            .expect("marker record serialization is infallible");
        format!("MapId: {}\n{SNIP}\n{body},\n{SNIP}", self.map_id)
    }
}

impl From<PolygonMarker> for MarkerRecord {
    fn from(marker: PolygonMarker) -> Self {
        Self {
            map_id: marker.map_id,
            name: marker.name,
            area: Area::Polygon { polygon: marker.points },
        }
    }
}

impl From<CircleMarker> for MarkerRecord {
    fn from(marker: CircleMarker) -> Self {
        Self {
            map_id: marker.map_id,
            name: marker.name,
            area: Area::Circle { center: marker.center, radius: marker.radius },
        }
    }
}

impl From<Marker> for MarkerRecord {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Polygon(polygon) => polygon.into(),
            Marker::Circle(circle) => circle.into(),
        }
    }
}
