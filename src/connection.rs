//! Marker link connection
//!
//! [`MarkerLink`] wires a snapshot provider to the capture state machine:
//! a driver task polls the provider and publishes snapshots, and a dispatch
//! task owns the [`CaptureState`], consuming trigger events and emitting
//! marker records.
//!
//! The dispatch task is the synchronization point required by the capture
//! semantics: it applies any pending snapshot update *before* each trigger
//! (biased select), so a trigger always reads a position/map pair produced
//! by a single poll cycle, never a stale position paired with a fresh map.

use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::capture::{CaptureState, Slot, Trigger};
use crate::driver::Driver;
use crate::emit::MarkerRecord;
use crate::provider::Provider;
use crate::providers::ScriptedProvider;
use crate::types::Snapshot;
use crate::{LinkError, Result};

/// Handle for delivering operator trigger events.
///
/// Cheap to clone; the external event source (hotkey registration, UI, test
/// harness) holds one and fires zero-argument triggers through it.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    tx: mpsc::UnboundedSender<Trigger>,
}

impl TriggerHandle {
    /// Deliver a trigger to the dispatch task.
    pub fn send(&self, trigger: Trigger) -> Result<()> {
        self.tx
            .send(trigger)
            .map_err(|_| LinkError::dispatch_closed("trigger channel"))
    }

    /// Capture the live position into the first slot.
    pub fn capture_first(&self) -> Result<()> {
        self.send(Trigger::Capture(Slot::First))
    }

    /// Capture the live position into the second slot.
    pub fn capture_second(&self) -> Result<()> {
        self.send(Trigger::Capture(Slot::Second))
    }

    /// Emit a thick-line polygon between the captured positions.
    pub fn line(&self) -> Result<()> {
        self.send(Trigger::Line)
    }

    /// Emit a fixed-radius circle at the live position.
    pub fn circle_at_point(&self) -> Result<()> {
        self.send(Trigger::CircleAtPoint)
    }

    /// Emit a circle sized by the captured pair, centered at the live position.
    pub fn circle_by_diameter(&self) -> Result<()> {
        self.send(Trigger::CircleByDiameter)
    }
}

/// Connection between a snapshot source and the marker engine
pub struct MarkerLink {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Option<Snapshot>>,

    /// Emitted marker records
    markers: mpsc::UnboundedReceiver<MarkerRecord>,

    /// Trigger dispatch handle
    triggers: TriggerHandle,

    /// Cancellation token for stopping tasks
    cancel: CancellationToken,
}

impl MarkerLink {
    /// Connect to live link telemetry.
    ///
    /// Establishes the shared memory mapping and starts the poll and
    /// dispatch tasks. The connection waits for the game to begin writing
    /// before snapshots flow.
    #[cfg(windows)]
    pub async fn connect() -> Result<Self> {
        info!("Connecting to live link telemetry");
        Ok(Self::start(crate::providers::LiveProvider::new()?))
    }

    /// Attempt to create a live connection on non-Windows platforms.
    ///
    /// This always returns an error as live link telemetry is only available
    /// on Windows. Consider a scripted connection for cross-platform testing.
    #[cfg(not(windows))]
    pub async fn connect() -> Result<Self> {
        Err(LinkError::unsupported_platform("Live link telemetry", "Windows"))
    }

    /// Create a connection replaying a recorded snapshot sequence.
    pub fn scripted(snapshots: Vec<Snapshot>) -> Self {
        Self::start(ScriptedProvider::new(snapshots))
    }

    /// Wire an arbitrary provider into the marker engine.
    pub fn start<P>(provider: P) -> Self
    where
        P: Provider,
    {
        let channels = Driver::spawn(provider);
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (marker_tx, marker_rx) = mpsc::unbounded_channel();

        let dispatch_snapshots = channels.snapshots.clone();
        let dispatch_cancel = channels.cancel.clone();
        tokio::spawn(async move {
            Self::dispatch_task(dispatch_snapshots, trigger_rx, marker_tx, dispatch_cancel).await;
        });

        Self {
            snapshots: channels.snapshots,
            markers: marker_rx,
            triggers: TriggerHandle { tx: trigger_tx },
            cancel: channels.cancel,
        }
    }

    /// Get a trigger handle for the external event source.
    pub fn triggers(&self) -> TriggerHandle {
        self.triggers.clone()
    }

    /// Get the current snapshot (if telemetry has arrived).
    pub fn current_snapshot(&self) -> Option<Snapshot> {
        *self.snapshots.borrow()
    }

    /// Get snapshot updates as a stream.
    ///
    /// Yields each published snapshot; ends when the provider ends.
    ///
    /// The stream owns its own watch receiver (`use<>`), so it does not
    /// borrow the connection and can outlive this call.
    pub fn snapshot_updates(&self) -> impl Stream<Item = Snapshot> + 'static + use<> {
        // The watch starts out None while waiting for telemetry; skip those
        // leading values so the stream does not appear to end before the
        // first snapshot, then stop on the first None after data flowed.
        WatchStream::new(self.snapshots.clone())
            .skip_while(Option::is_none)
            .take_while(Option::is_some)
            .filter_map(|opt| opt)
    }

    /// Receive the next emitted marker record.
    ///
    /// Returns `None` once the connection has shut down.
    pub async fn next_marker(&mut self) -> Option<MarkerRecord> {
        self.markers.recv().await
    }

    /// Dispatch task - owns the capture state, applies snapshots and triggers
    async fn dispatch_task(
        mut snapshots: watch::Receiver<Option<Snapshot>>,
        mut triggers: mpsc::UnboundedReceiver<Trigger>,
        markers: mpsc::UnboundedSender<MarkerRecord>,
        cancel: CancellationToken,
    ) {
        info!("Marker dispatch task started");
        let mut state = CaptureState::new();
        let mut stream_ended = false;

        loop {
            tokio::select! {
                // Biased: pending snapshot updates are applied before any
                // trigger, keeping position and map id from one poll cycle.
                biased;

                _ = cancel.cancelled() => {
                    info!("Marker dispatch cancelled");
                    break;
                }

                changed = snapshots.changed(), if !stream_ended => {
                    match changed {
                        Ok(()) => {
                            let latest = *snapshots.borrow_and_update();
                            match latest {
                                Some(snapshot) => state.observe(snapshot),
                                None => {
                                    // Provider ended; keep serving triggers
                                    // against the last observed state.
                                    debug!("Snapshot stream ended, keeping last state");
                                    stream_ended = true;
                                }
                            }
                        }
                        Err(_) => stream_ended = true,
                    }
                }

                trigger = triggers.recv() => {
                    let Some(trigger) = trigger else {
                        debug!("Trigger senders dropped, shutting down dispatch");
                        break;
                    };

                    if let Some(marker) = state.apply(trigger) {
                        let record = MarkerRecord::from(marker);
                        info!(map_id = record.map_id, "Marker emitted\n{}", record.render());

                        if markers.send(record).is_err() {
                            debug!("Marker receiver dropped, shutting down dispatch");
                            break;
                        }
                    }
                }
            }
        }

        info!("Marker dispatch task ended");
    }
}

impl Drop for MarkerLink {
    fn drop(&mut self) {
        debug!("Dropping marker link");
        // Cancel tasks on drop for clean shutdown
        self.cancel.cancel();
    }
}
