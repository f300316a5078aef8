//! DmxFlow Control - DMX512 serial output for RGB fixture strings
//!
//! This crate drives sixteen RGB fixtures over a DMX512 serial link:
//! - **DMX**: 513-byte frame buffer, fixture channel mapping, master dimmer
//! - **Serial link**: break / mark-after-break signalling at 250000 baud
//! - **Cycle**: green/red colour alternation on a configurable interval
//! - **Scheduler**: 40Hz frame refresh and cycle stepping in one task
//!
//! ## Feature Flags
//!
//! - `serial`: Real serial port backend (requires `serialport`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dmxflow_control::{CycleInterval, Session};
//!
//! # fn main() -> dmxflow_control::Result<()> {
//! let mut session = Session::serial();
//! session.connect("/dev/ttyUSB0")?;
//! session.start_cycle(CycleInterval::parse("500"));
//! println!("{}", session.status());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`dmx`] - Frame buffer, fixture layout, master dimmer and serial link
//! - [`cycle`] - Colour cycle state machine
//! - [`scheduler`] - Periodic activities
//! - [`session`] - Session object and commands
//! - [`driver`] - Async event loop
//! - [`config`] - Configuration file
//! - [`error`] - Error types

#![allow(missing_docs)]

// Core modules
/// Configuration file
pub mod config;
/// Error types
pub mod error;
/// Session object and commands
pub mod session;

// DMX output modules
/// Colour cycle
pub mod cycle;
/// DMX512 frame, layout and serial output
pub mod dmx;
/// Async event loop
pub mod driver;
/// Periodic activities
pub mod scheduler;

// Re-exports
pub use config::{DmxFlowConfig, LogConfig};
pub use cycle::{CycleController, CycleInterval, CyclePhase};
pub use dmx::{ChannelMapper, ColorChannel, DmxFrame, LinkTransmitter, MasterDimmer, Rgb};
pub use error::{ControlError, Result};
pub use scheduler::{Activity, Scheduler, REFRESH_PERIOD};
pub use session::{Command, Session};
