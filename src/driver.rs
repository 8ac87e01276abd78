//! Driver spawns and manages the snapshot poll task

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::provider::Provider;
use crate::types::Snapshot;

/// Result of spawning driver tasks
pub struct DriverChannels {
    /// Receiver for telemetry snapshots; `None` once the provider ends
    pub snapshots: watch::Receiver<Option<Snapshot>>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the snapshot poll task
///
/// The poll task owns the provider and publishes each snapshot through a
/// watch channel, so consumers always observe the latest complete snapshot
/// and never a partially-updated one.
pub struct Driver;

impl Driver {
    /// Spawn the poll task for the given provider
    ///
    /// Returns a watch receiver for snapshots plus a cancellation token for
    /// graceful shutdown.
    pub fn spawn<P>(provider: P) -> DriverChannels
    where
        P: Provider,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let cancel_poll = cancel.clone();
        tokio::spawn(async move {
            Self::poll_task(provider, snapshot_tx, cancel_poll).await;
        });

        DriverChannels { snapshots: snapshot_rx, cancel }
    }

    /// Poll task - reads snapshots from the provider and publishes them
    async fn poll_task<P>(
        mut provider: P,
        snapshot_tx: watch::Sender<Option<Snapshot>>,
        cancel: CancellationToken,
    ) where
        P: Provider,
    {
        info!("Snapshot poll task started");
        let mut snapshot_count = 0u64;
        let mut error_count = 0u32;
        const MAX_ERRORS: u32 = 10;

        loop {
            // Use select to allow cancellation during provider.next_snapshot()
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Poll task cancelled");
                    break;
                }
                result = provider.next_snapshot() => result,
            };

            match result {
                Ok(Some(snapshot)) => {
                    snapshot_count += 1;
                    error_count = 0;

                    trace!(
                        tick = snapshot.tick,
                        map_id = snapshot.map_id,
                        "Snapshot {}", snapshot_count
                    );

                    if snapshot_tx.send(Some(snapshot)).is_err() {
                        debug!("Snapshot receiver dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Provider stream ended after {} snapshots", snapshot_count);
                    // Send None to indicate end of stream
                    let _ = snapshot_tx.send(None);
                    break;
                }
                Err(e) => {
                    // Provider error - don't crash on transient failures
                    error_count += 1;
                    error!("Provider error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    if error_count >= MAX_ERRORS {
                        error!("Too many provider errors, shutting down");
                        let _ = snapshot_tx.send(None);
                        break;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ...
                    let backoff =
                        std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        info!("Poll task ended (published {} snapshots)", snapshot_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinkError;
    use crate::providers::ScriptedProvider;
    use glam::Vec2;

    #[tokio::test(start_paused = true)]
    async fn publishes_snapshots_then_none() {
        let snapshots = vec![
            Snapshot::new(1, Vec2::new(0.0, 0.0), 15),
            Snapshot::new(2, Vec2::new(1.0, 0.0), 15),
        ];
        let mut channels = Driver::spawn(ScriptedProvider::new(snapshots));

        let mut seen = Vec::new();
        loop {
            if channels.snapshots.changed().await.is_err() {
                break;
            }
            match *channels.snapshots.borrow_and_update() {
                Some(snapshot) => seen.push(snapshot.tick),
                None => break,
            }
        }

        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_poll_task() {
        let snapshots = vec![Snapshot::new(1, Vec2::ZERO, 15); 1000];
        let channels = Driver::spawn(ScriptedProvider::new(snapshots));

        channels.cancel.cancel();
        channels.cancel.cancelled().await;

        // The sender is dropped once the task unwinds; the receiver observes
        // closure instead of the full sequence.
        let mut snapshots = channels.snapshots;
        while snapshots.changed().await.is_ok() {}
        assert!(snapshots.borrow().is_none_or(|s| s.tick == 1));
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl Provider for FailingProvider {
        async fn next_snapshot(&mut self) -> crate::Result<Option<Snapshot>> {
            Err(LinkError::segment_failed("segment vanished"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_provider_errors_end_the_stream() {
        let mut channels = Driver::spawn(FailingProvider);

        // Backoff sleeps auto-advance under paused time; the task gives up
        // after MAX_ERRORS and publishes the end-of-stream None.
        channels.snapshots.changed().await.expect("end-of-stream None is published");
        assert!(channels.snapshots.borrow_and_update().is_none());
    }
}
