//! midir-backed input: each incoming message is treated as its own quantum.

use crate::capture::EventCapture;
use crate::clock::FrameClock;
use crate::error::{Error, Result};
use midir::{Ignore, MidiInput, MidiInputConnection};
use std::sync::Arc;
use tracing::{debug, info};

const CLIENT_NAME: &str = "midiosc";

/// Name of the port midiosc registers (virtual port) or opens (connection).
pub const INPUT_PORT_NAME: &str = "midiosc:in";

/// Live connection feeding an [`EventCapture`]. Dropping it closes the port.
pub struct HardwareInput {
    connection: Option<MidiInputConnection<EventCapture>>,
    port_name: String,
}

impl HardwareInput {
    /// Names of the MIDI inputs currently visible to the system.
    pub fn list_ports() -> Result<Vec<String>> {
        let midi_input = MidiInput::new(CLIENT_NAME)?;
        Ok(midi_input
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| {
                midi_input
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index))
            })
            .collect())
    }

    /// Connect `capture` to an input.
    ///
    /// With `source`, opens the first input whose name contains it
    /// (case-insensitive). Without, registers a virtual input port other
    /// clients can connect to (Unix only).
    ///
    /// `period` is the quantum length reported to the capture, which only
    /// matters for `SyncMode::Relative` lookahead.
    pub fn connect(
        source: Option<&str>,
        capture: EventCapture,
        clock: Arc<dyn FrameClock>,
        period: u32,
    ) -> Result<Self> {
        let mut midi_input = MidiInput::new(CLIENT_NAME)?;
        midi_input.ignore(Ignore::None);

        let callback = move |_stamp: u64, message: &[u8], capture: &mut EventCapture| {
            let now = clock.frame_time();
            capture.process(now, period, [(0u32, message)]);
        };

        match source {
            Some(wanted) => {
                let needle = wanted.to_lowercase();
                let ports = midi_input.ports();
                let (port, name) = ports
                    .iter()
                    .filter_map(|port| midi_input.port_name(port).ok().map(|name| (port, name)))
                    .find(|(_, name)| name.to_lowercase().contains(&needle))
                    .ok_or_else(|| {
                        Error::MidiPort(format!("No MIDI input matching '{}' found", wanted))
                    })?;
                let port = port.clone();
                debug!(port = %name, "connecting MIDI input");
                let connection = midi_input.connect(&port, INPUT_PORT_NAME, callback, capture)?;
                info!(port = %name, "connected MIDI input");
                Ok(Self {
                    connection: Some(connection),
                    port_name: name,
                })
            }
            None => Self::create_virtual(midi_input, callback, capture),
        }
    }

    #[cfg(unix)]
    fn create_virtual<F>(midi_input: MidiInput, callback: F, capture: EventCapture) -> Result<Self>
    where
        F: FnMut(u64, &[u8], &mut EventCapture) + Send + 'static,
    {
        use midir::os::unix::VirtualInput;

        let connection = midi_input.create_virtual(INPUT_PORT_NAME, callback, capture)?;
        info!(port = INPUT_PORT_NAME, "registered virtual MIDI input");
        Ok(Self {
            connection: Some(connection),
            port_name: INPUT_PORT_NAME.to_string(),
        })
    }

    #[cfg(not(unix))]
    fn create_virtual<F>(_midi_input: MidiInput, _callback: F, _capture: EventCapture) -> Result<Self>
    where
        F: FnMut(u64, &[u8], &mut EventCapture) + Send + 'static,
    {
        Err(Error::MidiPort(
            "virtual MIDI ports are not supported on this platform; pass an input name".into(),
        ))
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Close the connection and hand the capture back.
    pub fn close(mut self) -> Option<EventCapture> {
        self.connection.take().map(|connection| connection.close().1)
    }
}

impl std::fmt::Debug for HardwareInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HardwareInput")
            .field("port_name", &self.port_name)
            .finish()
    }
}
