//! Core types for marker derivation.
//!
//! - [`Snapshot`] is the planar telemetry unit that flows through the system
//! - [`PolygonMarker`] and [`CircleMarker`] are the computed marker shapes

mod marker;
mod snapshot;

pub use marker::{CIRCLE_MARKER_NAME, CircleMarker, LINE_MARKER_NAME, Marker, PolygonMarker};
pub use snapshot::Snapshot;
