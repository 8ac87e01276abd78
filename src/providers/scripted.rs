//! Scripted snapshot provider
//!
//! Replays a recorded snapshot sequence at a fixed pace. Cross-platform;
//! used to inject synthetic telemetry for deterministic tests and dry runs.

use std::time::Duration;
use tokio::time::{Interval, interval};
use tracing::{debug, trace};

use crate::Result;
use crate::provider::Provider;
use crate::types::Snapshot;

/// Default pacing between scripted snapshots.
const DEFAULT_PACE: Duration = Duration::from_millis(100);

/// Scripted provider that replays a fixed snapshot sequence
pub struct ScriptedProvider {
    snapshots: std::vec::IntoIter<Snapshot>,
    interval: Interval,
}

impl ScriptedProvider {
    /// Replay `snapshots` at the default 100 ms pace.
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Self::with_pace(snapshots, DEFAULT_PACE)
    }

    /// Replay `snapshots` with a custom pacing interval.
    pub fn with_pace(snapshots: Vec<Snapshot>, pace: Duration) -> Self {
        debug!(count = snapshots.len(), ?pace, "Scripted provider ready");
        Self { snapshots: snapshots.into_iter(), interval: interval(pace) }
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    async fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        // Pace first so the initial snapshot is not delivered mid-setup.
        self.interval.tick().await;

        match self.snapshots.next() {
            Some(snapshot) => {
                trace!(tick = snapshot.tick, "Scripted snapshot");
                Ok(Some(snapshot))
            }
            None => {
                debug!("Scripted sequence ended");
                Ok(None)
            }
        }
    }
}
