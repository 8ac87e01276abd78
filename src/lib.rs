//! Modern, type-safe Rust library for Guild Wars 2 link telemetry markers.
//!
//! Waymark decodes the MumbleLink shared memory segment written by a running
//! game client and turns operator-triggered position captures into polygon
//! and circle marker definitions for overlay tools.
//!
//! # Features
//!
//! - **Live Telemetry**: polls the link segment on Windows (1 s startup
//!   grace, 100 ms once the game is writing)
//! - **Explicit Decoding**: every field read at its documented offset;
//!   crafted byte buffers decode identically on every platform
//! - **Marker Geometry**: thick-line quadrilaterals and point/diameter
//!   circles from two captured positions
//! - **Deterministic Testing**: scripted snapshot replay and synthetic
//!   trigger injection instead of real keyboard input
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use waymark::Waymark;
//!
//! #[tokio::main]
//! async fn main() -> waymark::Result<()> {
//!     let mut link = Waymark::connect().await?;
//!     let triggers = link.triggers();
//!
//!     // Wire `triggers` into a hotkey layer, then consume records:
//!     while let Some(record) = link.next_marker().await {
//!         println!("{}", record.render());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod capture;
mod error;
pub mod emit;
pub mod geometry;
pub mod types;

// Stream-based telemetry architecture
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;

// Data source modules
pub mod link;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use capture::{CaptureState, Slot, Trigger};
pub use emit::{Area, MarkerRecord};
pub use error::*;
pub use types::*;

// Link exports
pub use link::{LinkContext, LinkData, MUMBLE_LINK_NAME, SEGMENT_SIZE};

// Windows memory exports
#[cfg(windows)]
pub use windows::SharedSegment;

// Main API exports
pub use connection::{MarkerLink, TriggerHandle};

/// Unified entry point for marker link connections.
///
/// # Examples
///
/// ## Live Telemetry (Windows)
/// ```rust,no_run
/// use waymark::Waymark;
///
/// #[tokio::main]
/// async fn main() -> waymark::Result<()> {
///     let link = Waymark::connect().await?;
///     // Use link...
///     Ok(())
/// }
/// ```
///
/// ## Scripted Replay (Cross-platform)
/// ```rust,no_run
/// use glam::Vec2;
/// use waymark::{Snapshot, Waymark};
///
/// #[tokio::main]
/// async fn main() -> waymark::Result<()> {
///     let link = Waymark::scripted(vec![Snapshot::new(1, Vec2::ZERO, 15)]);
///     // Use link...
///     Ok(())
/// }
/// ```
pub struct Waymark;

impl Waymark {
    /// Connect to live link telemetry.
    ///
    /// Maps the shared memory segment and starts polling. The connection
    /// waits for the game to begin writing before snapshots flow.
    ///
    /// # Platform
    ///
    /// Only available on Windows where the game runs. On other platforms
    /// this method returns an `UnsupportedPlatform` error.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared memory segment cannot be created or
    /// mapped; without it there is no telemetry to decode, so this aborts
    /// startup.
    pub async fn connect() -> Result<MarkerLink> {
        MarkerLink::connect().await
    }

    /// Replay a recorded snapshot sequence.
    ///
    /// The returned connection behaves identically to a live one: snapshots
    /// flow on a fixed pace and triggers compute markers against the latest
    /// observed state. Cross-platform.
    pub fn scripted(snapshots: Vec<Snapshot>) -> MarkerLink {
        MarkerLink::scripted(snapshots)
    }
}
