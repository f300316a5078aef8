//! DMX512 universe buffer

use super::{DMX_CHANNELS, DMX_FRAME_SIZE, DMX_START_CODE};

/// A full DMX512 frame: start code at index 0, channels 1-512 after it.
///
/// The start code slot is never writable, so the frame is always a valid
/// null-start-code packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmxFrame {
    data: [u8; DMX_FRAME_SIZE],
}

impl DmxFrame {
    /// Create a frame with every channel at zero
    pub fn new() -> Self {
        Self {
            data: [DMX_START_CODE; DMX_FRAME_SIZE],
        }
    }

    /// Reset channels 1-512 to zero. The start code is left alone.
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Set every channel (1-512) to the same value
    pub fn fill(&mut self, value: u8) {
        self.data[1..].fill(value);
    }

    /// Write a single channel.
    ///
    /// `channel` is 1-based, matching DMX addressing. Writes to the start code
    /// slot or past channel 512 are ignored.
    pub fn set_channel(&mut self, channel: usize, value: u8) {
        if (1..=DMX_CHANNELS).contains(&channel) {
            self.data[channel] = value;
        }
    }

    /// Read a slot. Index 0 is the start code; out-of-range reads return 0.
    pub fn get(&self, index: usize) -> u8 {
        self.data.get(index).copied().unwrap_or(0)
    }

    /// The full 513-byte frame as it goes on the wire
    pub fn read(&self) -> &[u8; DMX_FRAME_SIZE] {
        &self.data
    }

    /// Channels 1-512 without the start code
    pub fn channels(&self) -> &[u8] {
        &self.data[1..]
    }

    /// True when every channel is zero
    pub fn is_dark(&self) -> bool {
        self.channels().iter().all(|&v| v == 0)
    }
}

impl Default for DmxFrame {
    fn default() -> Self {
        Self::new()
    }
}
