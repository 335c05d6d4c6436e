//! Consumer thread: drains the handoff queue, waits for event deadlines and
//! hands events to the dispatcher.

use crate::dispatch::{DispatchStats, Dispatcher, OscTransport};
use crate::shutdown::ShutdownToken;
use midiosc_midi::{EventConsumer, FrameClock, RawEvent, SyncMode, WakeSignal};
use midiosc_rules::RuleSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Upper bound on a sleep while waiting for work. Covers wake-ups the
/// realtime thread skipped because the lock was busy.
pub const WAKE_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound on one sleep while delaying an event.
pub const MAX_DELAY_SLICE: Duration = Duration::from_millis(10);

/// When `now` and a deadline disagree in this bit the frame counter has
/// wrapped between them and the deadline is treated as passed. This is an
/// approximation: it can also fire for deadlines that straddle 2^31.
const ROLLOVER_BIT: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    WaitingForWork,
    Draining,
    Delaying,
    ShuttingDown,
}

/// What the consumer did before it exited.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerReport {
    pub stats: DispatchStats,
    /// Events the realtime side could not queue.
    pub dropped: u64,
    /// Events left in the queue at exit.
    pub pending: usize,
    /// An event whose delay was cut short by shutdown.
    pub interrupted: bool,
}

pub struct ConsumerLoop<T> {
    events: EventConsumer,
    rules: RuleSet,
    dispatcher: Dispatcher<T>,
    clock: Arc<dyn FrameClock>,
    sync_mode: SyncMode,
    deadzone: u32,
    wake: Arc<WakeSignal>,
    shutdown: ShutdownToken,
}

impl<T: OscTransport> ConsumerLoop<T> {
    pub fn new(
        events: EventConsumer,
        rules: RuleSet,
        dispatcher: Dispatcher<T>,
        clock: Arc<dyn FrameClock>,
        sync_mode: SyncMode,
        wake: Arc<WakeSignal>,
        shutdown: ShutdownToken,
    ) -> Self {
        let deadzone = sync_mode.deadzone(clock.sample_rate());
        Self {
            events,
            rules,
            dispatcher,
            clock,
            sync_mode,
            deadzone,
            wake,
            shutdown,
        }
    }

    pub fn deadzone(&self) -> u32 {
        self.deadzone
    }

    pub fn dropped(&self) -> u64 {
        self.events.dropped()
    }

    pub fn pending(&self) -> usize {
        self.events.pending()
    }

    /// Run until the shutdown token is cancelled.
    pub fn run(mut self) -> ConsumerReport {
        let mut report = ConsumerReport::default();
        let mut state = ConsumerState::WaitingForWork;
        let mut current: Option<RawEvent> = None;

        debug!(sync_mode = %self.sync_mode, deadzone = self.deadzone, "consumer running");

        loop {
            state = match state {
                ConsumerState::WaitingForWork => {
                    if self.shutdown.is_cancelled() {
                        ConsumerState::ShuttingDown
                    } else {
                        let events = &self.events;
                        let shutdown = &self.shutdown;
                        self.wake.wait_while(WAKE_INTERVAL, || {
                            events.is_empty() && !shutdown.is_cancelled()
                        });
                        ConsumerState::Draining
                    }
                }
                ConsumerState::Draining => {
                    if self.shutdown.is_cancelled() {
                        ConsumerState::ShuttingDown
                    } else if let Some(event) = self.events.pop() {
                        trace!("RX MIDI: {:?}", event);
                        if self.sync_mode.is_timed() {
                            current = Some(event);
                            ConsumerState::Delaying
                        } else {
                            report.stats += self.dispatcher.dispatch(&self.rules, &event);
                            ConsumerState::Draining
                        }
                    } else {
                        ConsumerState::WaitingForWork
                    }
                }
                ConsumerState::Delaying => match current.take() {
                    Some(event) => {
                        if self.wait_until_due(&event) {
                            report.stats += self.dispatcher.dispatch(&self.rules, &event);
                            ConsumerState::Draining
                        } else {
                            report.interrupted = true;
                            ConsumerState::ShuttingDown
                        }
                    }
                    None => ConsumerState::Draining,
                },
                ConsumerState::ShuttingDown => break,
            };
        }

        report.dropped = self.events.dropped();
        report.pending = self.events.pending();
        debug!(?report, "consumer stopped");
        report
    }

    /// Sleep until the event's deadline. Returns `false` if shutdown was
    /// requested first.
    fn wait_until_due(&self, event: &RawEvent) -> bool {
        let deadline = event.frame().wrapping_add(self.deadzone);
        loop {
            if self.shutdown.is_cancelled() {
                return false;
            }
            let now = self.clock.frame_time();
            if now >= deadline || (now ^ deadline) & ROLLOVER_BIT != 0 {
                return true;
            }

            let slice = self
                .clock
                .frames_to_duration(deadline - now)
                .min(MAX_DELAY_SLICE);
            let shutdown = &self.shutdown;
            self.wake.wait_while(slice, || !shutdown.is_cancelled());
        }
    }
}

impl<T> std::fmt::Debug for ConsumerLoop<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerLoop")
            .field("rules", &self.rules.len())
            .field("sync_mode", &self.sync_mode)
            .field("deadzone", &self.deadzone)
            .finish_non_exhaustive()
    }
}
