//! DMX output system
//!
//! This module provides DMX512 output over a serial (RS-485) link.
//!
//! ## DMX512
//!
//! A DMX512 universe is a 513-byte frame: one start code followed by 512
//! channel slots. The frame has no framing bytes of its own; receivers detect
//! the start of a frame by a line break followed by a mark-after-break.
//! - 250000 baud, 8 data bits, no parity, 2 stop bits
//! - Retransmitted continuously (here at 40Hz)
//!
//! ## Fixture layout
//!
//! Sixteen RGB fixtures sit on a stride-3 pattern starting at channel 2:
//! green, blue, red. Channel 1 is the master dimmer and follows fixture 0.
//!
//! ## Example Usage
//!
//! ```rust
//! use dmxflow_control::dmx::{ChannelMapper, DmxFrame, Rgb};
//!
//! let mut frame = DmxFrame::new();
//! ChannelMapper::apply_rgb(&mut frame, Rgb::new(255, 128, 0));
//!
//! assert_eq!(frame.get(1), 255); // master dimmer
//! assert_eq!(frame.get(2), 128); // fixture 0 green
//! assert_eq!(frame.get(4), 255); // fixture 0 red
//! ```

pub mod dimmer;
pub mod frame;
pub mod layout;
pub mod serial;

pub use dimmer::MasterDimmer;
pub use frame::DmxFrame;
pub use layout::{ChannelMapper, ColorChannel, FixtureLayout, Rgb};
pub use serial::{DmxPort, LinkSettings, LinkTransmitter, PortOpener};

#[cfg(feature = "serial")]
pub use serial::{available_ports, SerialPortOpener};

/// DMX512 null start code
pub const DMX_START_CODE: u8 = 0x00;
/// Number of channel slots in a universe
pub const DMX_CHANNELS: usize = 512;
/// Start code + 512 channel slots
pub const DMX_FRAME_SIZE: usize = DMX_CHANNELS + 1;
/// DMX512 line rate
pub const DMX_BAUD: u32 = 250_000;
