//! Builder for configuring and constructing a [`Bridge`].

use crate::consumer::ConsumerLoop;
use crate::dispatch::{Dispatcher, OscTransport, UdpTransport};
use crate::shutdown::ShutdownToken;
use crate::{Bridge, Error, Result};
use midiosc_midi::{
    handoff_queue_with_capacity, EventCapture, FrameClock, SystemClock, WakeSignal,
    DEFAULT_QUEUE_CAPACITY,
};
use midiosc_rules::{Destination, ParsedConfig, RuleSet, Settings, SyncMode};
use std::sync::Arc;

/// Nominal rate for the default [`SystemClock`].
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Unset values fall back to: sync mode Immediate, destination
/// `localhost:3819`, a 64 event queue, a [`SystemClock`] at 48kHz and a
/// [`UdpTransport`] to the destination.
///
/// # Example
///
/// ```ignore
/// use midiosc::prelude::*;
///
/// let parsed = parse_config(&std::fs::read_to_string("default.cfg")?)?;
/// let mut bridge = Bridge::builder().config(parsed).build()?;
/// let capture = bridge.take_capture().unwrap();
/// bridge.start()?;
/// ```
#[derive(Default)]
pub struct BridgeBuilder {
    rules: RuleSet,
    settings: Settings,
    queue_capacity: Option<usize>,
    clock: Option<Arc<dyn FrameClock>>,
    transport: Option<Box<dyn OscTransport>>,
}

impl BridgeBuilder {
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Replaces all settings. Individual setters called afterwards win.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Rules and settings from a parsed config.
    pub fn config(self, config: ParsedConfig) -> Self {
        self.rules(config.rules).settings(config.settings)
    }

    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.settings.sync_mode = Some(mode);
        self
    }

    pub fn destination(mut self, destination: Destination) -> Self {
        self.settings.destination = Some(destination);
        self
    }

    /// Default: 64
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn FrameClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Send messages through `transport` instead of UDP.
    pub fn transport(mut self, transport: impl OscTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn build(self) -> Result<Bridge> {
        if self.rules.is_empty() {
            return Err(Error::NoRules);
        }

        let sync_mode = self.settings.sync_mode.unwrap_or_default();
        let destination = self.settings.destination.unwrap_or_default();

        let (producer, consumer) =
            handoff_queue_with_capacity(self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY))?;

        let clock = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock::new(DEFAULT_SAMPLE_RATE)?),
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(UdpTransport::connect(&destination)?),
        };

        let wake = Arc::new(WakeSignal::new());
        let shutdown = ShutdownToken::new(Arc::clone(&wake));
        let capture = EventCapture::new(producer, sync_mode, Arc::clone(&wake));

        let rule_count = self.rules.len();
        let consumer = ConsumerLoop::new(
            consumer,
            self.rules,
            Dispatcher::new(transport),
            clock,
            sync_mode,
            wake,
            shutdown.clone(),
        );

        Ok(Bridge::new(
            capture,
            consumer,
            shutdown,
            sync_mode,
            destination,
            rule_count,
        ))
    }
}

impl std::fmt::Debug for BridgeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeBuilder")
            .field("rules", &self.rules.len())
            .field("settings", &self.settings)
            .field("queue_capacity", &self.queue_capacity)
            .field("custom_clock", &self.clock.is_some())
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midiosc_rules::parse_config;

    #[test]
    fn test_empty_rule_set_is_rejected() {
        let err = Bridge::builder().build().unwrap_err();
        assert!(matches!(err, Error::NoRules));
    }

    #[test]
    fn test_zero_capacity_is_fatal() {
        let parsed = parse_config("[rule]\nANY *\n").unwrap();
        let err = Bridge::builder()
            .config(parsed)
            .queue_capacity(0)
            .destination(Destination::new("127.0.0.1", 9000))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Midi(_)));
    }

    #[test]
    fn test_setters_override_config() {
        let parsed = parse_config("[config]\nsyncmode=Absolute\nosc=9000\n[rule]\nANY *\n").unwrap();
        let bridge = Bridge::builder()
            .config(parsed)
            .sync_mode(SyncMode::Relative)
            .build()
            .unwrap();
        assert_eq!(bridge.sync_mode(), SyncMode::Relative);
        assert_eq!(bridge.destination(), &Destination::new("localhost", 9000));
    }
}
