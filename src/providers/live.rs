//! Live snapshot provider for Windows

use std::time::Duration;
use tokio::time::{Instant, Interval};
use tracing::{debug, info, trace};

use crate::Result;
use crate::link::MUMBLE_LINK_NAME;
use crate::provider::Provider;
use crate::types::Snapshot;
use crate::windows::SharedSegment;

/// Poll interval while the game has not started writing (`tick == 0`).
const STARTUP_POLL: Duration = Duration::from_secs(1);

/// Poll interval once telemetry is live.
const LIVE_POLL: Duration = Duration::from_millis(100);

/// Live provider that reads from the MumbleLink shared memory segment
pub struct LiveProvider {
    /// Mapped shared memory segment
    segment: SharedSegment,

    /// Live pacing interval; absent until the first non-zero tick
    interval: Option<Interval>,

    /// Polls spent waiting for the game, for periodic progress logs
    waiting_polls: u32,
}

impl LiveProvider {
    /// Create a provider on the default segment name.
    pub fn new() -> Result<Self> {
        Self::with_name(MUMBLE_LINK_NAME)
    }

    /// Create a provider on a renamed segment (the game supports alternate
    /// segment names for running multiple clients).
    pub fn with_name(name: &str) -> Result<Self> {
        let segment = SharedSegment::open(name)?;
        info!(name, "Opened link segment");

        Ok(Self { segment, interval: None, waiting_polls: 0 })
    }
}

#[async_trait::async_trait]
impl Provider for LiveProvider {
    async fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        // Loop until the game produces a frame. Live telemetry never ends on
        // its own; termination is external.
        loop {
            if let Some(interval) = self.interval.as_mut() {
                interval.tick().await;
            }

            let link = self.segment.read_link();

            if link.ui_tick == 0 {
                self.waiting_polls += 1;

                if self.waiting_polls == 1 {
                    info!("Waiting for the game to start writing telemetry...");
                } else if self.waiting_polls % 30 == 0 {
                    debug!(elapsed_s = self.waiting_polls, "Still waiting for telemetry");
                }

                // Game went away or has not started: fall back to the slow
                // startup cadence until the tick moves again.
                self.interval = None;
                tokio::time::sleep(STARTUP_POLL).await;
                continue;
            }

            if self.interval.is_none() {
                info!(
                    application = %link.name,
                    map_id = link.context.map_id,
                    tick = link.ui_tick,
                    "Link telemetry live"
                );
                self.waiting_polls = 0;
                self.interval =
                    Some(tokio::time::interval_at(Instant::now() + LIVE_POLL, LIVE_POLL));
            }

            let snapshot = Snapshot::from_link(&link);
            trace!(
                tick = snapshot.tick,
                x = snapshot.position.x,
                y = snapshot.position.y,
                map_id = snapshot.map_id,
                "Snapshot"
            );

            return Ok(Some(snapshot));
        }
    }
}
