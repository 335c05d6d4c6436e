//! The running bridge: realtime capture on one side, consumer thread on the other.

use crate::builder::BridgeBuilder;
use crate::consumer::{ConsumerLoop, ConsumerReport};
use crate::dispatch::{DispatchStats, OscTransport};
use crate::shutdown::ShutdownToken;
use crate::Result;
use midiosc_midi::{CaptureGate, EventCapture};
use midiosc_rules::{Destination, SyncMode};
use std::thread::{self, JoinHandle};
use tracing::{error, info};

const CONSUMER_THREAD_NAME: &str = "midiosc-consumer";

/// Totals reported when the bridge stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSummary {
    /// Events lost because the handoff queue was full.
    pub dropped: u64,
    pub dispatched: DispatchStats,
    /// Events still queued when the consumer exited.
    pub pending: usize,
    pub interrupted: bool,
}

impl From<ConsumerReport> for BridgeSummary {
    fn from(report: ConsumerReport) -> Self {
        Self {
            dropped: report.dropped,
            dispatched: report.stats,
            pending: report.pending,
            interrupted: report.interrupted,
        }
    }
}

/// Owns the consumer thread and, until it is taken, the realtime capture.
///
/// The [`EventCapture`] must be moved to whatever runs the realtime callback
/// (see [`Bridge::take_capture`]); it only queues events while the bridge
/// is started.
pub struct Bridge {
    capture: Option<EventCapture>,
    gate: CaptureGate,
    consumer: Option<ConsumerLoop<Box<dyn OscTransport>>>,
    thread: Option<JoinHandle<ConsumerReport>>,
    shutdown: ShutdownToken,
    sync_mode: SyncMode,
    destination: Destination,
    rule_count: usize,
    summary: Option<BridgeSummary>,
}

impl Bridge {
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::default()
    }

    pub(crate) fn new(
        capture: EventCapture,
        consumer: ConsumerLoop<Box<dyn OscTransport>>,
        shutdown: ShutdownToken,
        sync_mode: SyncMode,
        destination: Destination,
        rule_count: usize,
    ) -> Self {
        Self {
            gate: capture.gate(),
            capture: Some(capture),
            consumer: Some(consumer),
            thread: None,
            shutdown,
            sync_mode,
            destination,
            rule_count,
            summary: None,
        }
    }

    /// Hand the realtime side to its callback. Returns `None` once taken.
    pub fn take_capture(&mut self) -> Option<EventCapture> {
        self.capture.take()
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Spawn the consumer thread and open the capture gate. A no-op if
    /// already started; a stopped bridge cannot be restarted.
    pub fn start(&mut self) -> Result<()> {
        let Some(consumer) = self.consumer.take() else {
            return Ok(());
        };

        let handle = thread::Builder::new()
            .name(CONSUMER_THREAD_NAME.into())
            .spawn(move || consumer.run())?;

        self.thread = Some(handle);
        self.gate.open();
        info!(
            destination = %self.destination.url(),
            sync_mode = %self.sync_mode,
            rules = self.rule_count,
            "bridge running"
        );
        Ok(())
    }

    /// Close the gate, cancel the consumer and wait for it. Repeated calls
    /// return the same summary.
    pub fn stop(&mut self) -> BridgeSummary {
        if let Some(summary) = self.summary {
            return summary;
        }

        self.gate.close();
        self.shutdown.cancel();

        let summary = match self.thread.take() {
            Some(handle) => match handle.join() {
                Ok(report) => BridgeSummary::from(report),
                Err(_) => {
                    error!("consumer thread panicked");
                    BridgeSummary::default()
                }
            },
            None => BridgeSummary {
                dropped: self.consumer.as_ref().map_or(0, ConsumerLoop::dropped),
                pending: self.consumer.as_ref().map_or(0, ConsumerLoop::pending),
                ..Default::default()
            },
        };
        self.consumer = None;

        info!("Dropped Messages: {}", summary.dropped);
        info!(
            events = summary.dispatched.events,
            sent = summary.dispatched.sent,
            abandoned = summary.dispatched.abandoned,
            transport_failures = summary.dispatched.transport_failures,
            "bridge stopped"
        );
        self.summary = Some(summary);
        summary
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("sync_mode", &self.sync_mode)
            .field("destination", &self.destination)
            .field("rules", &self.rule_count)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
