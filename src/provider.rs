//! Provider trait for snapshot sources

use crate::Result;
use crate::types::Snapshot;

/// Trait for link telemetry sources
///
/// Providers abstract over different data sources (live shared memory,
/// scripted replays) and handle their own pacing internally. The trait is
/// designed for simplicity - a single method covers all needs.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Get the next telemetry snapshot
    ///
    /// Returns:
    /// - `Ok(Some(snapshot))` - New snapshot available
    /// - `Ok(None)` - Stream ended (normal termination)
    /// - `Err(e)` - Error occurred
    ///
    /// Each provider handles timing internally:
    /// - Live: 1 s startup grace while the game is silent, 100 ms once live
    /// - Scripted: replays a recorded sequence at its configured pace
    async fn next_snapshot(&mut self) -> Result<Option<Snapshot>>;
}
