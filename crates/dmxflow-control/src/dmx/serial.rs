//! DMX512 over a serial line
//!
//! Each frame is preceded by a break and a mark-after-break, then all 513
//! bytes are written in one transfer at 250000 baud, 8N2.

use std::io;
use std::thread;
use std::time::Duration;

use super::{DmxFrame, DMX_BAUD};
use crate::{error::ControlError, Result};

/// A link that can signal a DMX break and carry frame bytes
pub trait DmxPort: Send {
    /// Assert (`true`) or release (`false`) the break condition
    fn set_break(&mut self, asserted: bool) -> io::Result<()>;

    /// Write all bytes of a frame
    fn write_frame(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Opens [`DmxPort`]s by identifier (e.g. `/dev/ttyUSB0` or `COM3`)
pub trait PortOpener: Send {
    fn open(&self, identifier: &str, settings: &LinkSettings) -> io::Result<Box<dyn DmxPort>>;
}

/// Line parameters and break timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    /// How long the break is held
    pub break_time: Duration,
    /// Idle gap between releasing the break and the start code
    pub mark_after_break: Duration,
    pub write_timeout: Duration,
}

impl LinkSettings {
    /// 250000 baud 8N2 with 1ms break and 1ms mark-after-break
    pub const DMX512: LinkSettings = LinkSettings {
        baud_rate: DMX_BAUD,
        break_time: Duration::from_millis(1),
        mark_after_break: Duration::from_millis(1),
        write_timeout: Duration::from_millis(100),
    };
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self::DMX512
    }
}

/// Owns the open serial link and pushes frames down it
pub struct LinkTransmitter {
    opener: Box<dyn PortOpener>,
    settings: LinkSettings,
    port: Option<Box<dyn DmxPort>>,
    port_name: Option<String>,
    frames_sent: u64,
}

impl LinkTransmitter {
    /// Create a transmitter with the standard DMX512 line settings
    pub fn new(opener: Box<dyn PortOpener>) -> Self {
        Self::with_settings(opener, LinkSettings::DMX512)
    }

    pub fn with_settings(opener: Box<dyn PortOpener>, settings: LinkSettings) -> Self {
        Self {
            opener,
            settings,
            port: None,
            port_name: None,
            frames_sent: 0,
        }
    }

    /// Open the link at `identifier`.
    ///
    /// Any link that is already open is closed first. On failure nothing is
    /// left open.
    pub fn connect(&mut self, identifier: &str) -> Result<()> {
        self.disconnect();

        let port = self
            .opener
            .open(identifier, &self.settings)
            .map_err(|source| ControlError::Connection {
                port: identifier.to_string(),
                source,
            })?;

        tracing::info!(
            "DMX port {} opened at {} baud",
            identifier,
            self.settings.baud_rate
        );

        self.port = Some(port);
        self.port_name = Some(identifier.to_string());
        Ok(())
    }

    /// Close the link if one is open. Returns whether a link was closed.
    pub fn disconnect(&mut self) -> bool {
        match self.port.take() {
            Some(_) => {
                if let Some(name) = self.port_name.take() {
                    tracing::info!("DMX port {} closed", name);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Identifier of the open link
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Frames written successfully since creation
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Break, mark-after-break, then the whole frame.
    ///
    /// Blocks for the break and mark-after-break durations.
    pub fn transmit(&mut self, frame: &DmxFrame) -> Result<()> {
        let port = self.port.as_mut().ok_or(ControlError::NotConnected)?;

        port.set_break(true).map_err(ControlError::Transmit)?;
        thread::sleep(self.settings.break_time);
        port.set_break(false).map_err(ControlError::Transmit)?;
        thread::sleep(self.settings.mark_after_break);

        port.write_frame(frame.read()).map_err(ControlError::Transmit)?;

        self.frames_sent += 1;
        tracing::trace!("Sent DMX frame #{}", self.frames_sent);

        Ok(())
    }

    /// Transmit, discarding any failure.
    ///
    /// The frame is resent on every refresh tick, so a failed write is
    /// recovered by the next one. Returns whether the frame went out.
    pub fn transmit_best_effort(&mut self, frame: &DmxFrame) -> bool {
        match self.transmit(frame) {
            Ok(()) => true,
            Err(ControlError::NotConnected) => false,
            Err(e) => {
                tracing::debug!("Dropped DMX frame: {}", e);
                false
            }
        }
    }
}

#[cfg(feature = "serial")]
mod backend {
    use std::io::{self, Write};

    use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

    use super::{DmxPort, LinkSettings, PortOpener};
    use crate::Result;

    /// Opens real serial ports through the `serialport` crate
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SerialPortOpener;

    impl PortOpener for SerialPortOpener {
        fn open(&self, identifier: &str, settings: &LinkSettings) -> io::Result<Box<dyn DmxPort>> {
            let port = serialport::new(identifier, settings.baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::Two)
                .flow_control(FlowControl::None)
                .timeout(settings.write_timeout)
                .open()?;

            Ok(Box::new(SerialDmxPort { port }))
        }
    }

    struct SerialDmxPort {
        port: Box<dyn SerialPort>,
    }

    impl DmxPort for SerialDmxPort {
        fn set_break(&mut self, asserted: bool) -> io::Result<()> {
            if asserted {
                self.port.set_break()?;
            } else {
                self.port.clear_break()?;
            }
            Ok(())
        }

        fn write_frame(&mut self, data: &[u8]) -> io::Result<()> {
            self.port.write_all(data)?;
            self.port.flush()
        }
    }

    /// Names of the serial ports present on this machine
    pub fn available_ports() -> Result<Vec<String>> {
        let ports = serialport::available_ports().map_err(io::Error::from)?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }
}

#[cfg(feature = "serial")]
pub use backend::{available_ports, SerialPortOpener};

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory port that records what was sent

    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::{DmxPort, LinkSettings, PortOpener};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum WireEvent {
        Opened(String),
        Break(bool),
        Frame(Vec<u8>),
        Closed,
    }

    #[derive(Default)]
    pub struct WireState {
        pub events: Vec<WireEvent>,
        /// Scripted results for upcoming writes; empty means success
        pub write_failures: VecDeque<bool>,
        pub refuse_open: bool,
    }

    #[derive(Clone, Default)]
    pub struct MockWire(pub Arc<Mutex<WireState>>);

    impl MockWire {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn opener(&self) -> Box<dyn PortOpener> {
            Box::new(self.clone())
        }

        pub fn events(&self) -> Vec<WireEvent> {
            self.0.lock().unwrap().events.clone()
        }

        pub fn frames(&self) -> Vec<Vec<u8>> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    WireEvent::Frame(f) => Some(f),
                    _ => None,
                })
                .collect()
        }

        pub fn fail_next_write(&self) {
            self.0.lock().unwrap().write_failures.push_back(true);
        }

        pub fn refuse_open(&self, refuse: bool) {
            self.0.lock().unwrap().refuse_open = refuse;
        }
    }

    impl PortOpener for MockWire {
        fn open(&self, identifier: &str, _settings: &LinkSettings) -> io::Result<Box<dyn DmxPort>> {
            let mut state = self.0.lock().unwrap();
            if state.refuse_open {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such port"));
            }
            state.events.push(WireEvent::Opened(identifier.to_string()));
            Ok(Box::new(MockPort(self.0.clone())))
        }
    }

    struct MockPort(Arc<Mutex<WireState>>);

    impl DmxPort for MockPort {
        fn set_break(&mut self, asserted: bool) -> io::Result<()> {
            self.0.lock().unwrap().events.push(WireEvent::Break(asserted));
            Ok(())
        }

        fn write_frame(&mut self, data: &[u8]) -> io::Result<()> {
            let mut state = self.0.lock().unwrap();
            if state.write_failures.pop_front().unwrap_or(false) {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
            }
            state.events.push(WireEvent::Frame(data.to_vec()));
            Ok(())
        }
    }

    impl Drop for MockPort {
        fn drop(&mut self) {
            if let Ok(mut state) = self.0.lock() {
                state.events.push(WireEvent::Closed);
            }
        }
    }
}
