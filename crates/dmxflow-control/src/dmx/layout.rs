//! Fixture layout and RGB channel mapping

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DmxFrame, MasterDimmer};

/// Colour channel of an RGB fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    /// Position of this colour inside a fixture's channel group.
    ///
    /// The fixtures on this rig are wired green, blue, red.
    fn slot(self) -> usize {
        match self {
            ColorChannel::Green => 0,
            ColorChannel::Blue => 1,
            ColorChannel::Red => 2,
        }
    }
}

impl fmt::Display for ColorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// An RGB triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Value of a single colour
    pub fn get(&self, channel: ColorChannel) -> u8 {
        match channel {
            ColorChannel::Red => self.r,
            ColorChannel::Green => self.g,
            ColorChannel::Blue => self.b,
        }
    }

    /// Replace a single colour
    pub fn set(&mut self, channel: ColorChannel, value: u8) {
        match channel {
            ColorChannel::Red => self.r = value,
            ColorChannel::Green => self.g = value,
            ColorChannel::Blue => self.b = value,
        }
    }
}

/// Fixed repeating fixture layout.
///
/// Fixture `i` occupies channels `start + stride * i` onwards, one channel per
/// colour. With the defaults the last fixture ends at channel 49.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureLayout {
    pub start_address: usize,
    pub stride: usize,
    pub fixture_count: usize,
}

impl FixtureLayout {
    /// The 16-fixture rig driven by this application
    pub const STANDARD: FixtureLayout = FixtureLayout {
        start_address: 2,
        stride: 3,
        fixture_count: 16,
    };

    /// DMX address of one colour of one fixture
    pub fn address(&self, fixture: usize, channel: ColorChannel) -> usize {
        self.start_address + self.stride * fixture + channel.slot()
    }

    /// Every DMX address carrying `channel`, in fixture order
    pub fn addresses(&self, channel: ColorChannel) -> impl Iterator<Item = usize> + '_ {
        (0..self.fixture_count).map(move |i| self.address(i, channel))
    }

    /// Highest address used by the layout
    pub fn end_address(&self) -> usize {
        self.start_address + self.stride * self.fixture_count - 1
    }

    /// Colour currently set on one fixture
    pub fn read_fixture(&self, frame: &DmxFrame, fixture: usize) -> Rgb {
        Rgb::new(
            frame.get(self.address(fixture, ColorChannel::Red)),
            frame.get(self.address(fixture, ColorChannel::Green)),
            frame.get(self.address(fixture, ColorChannel::Blue)),
        )
    }
}

impl Default for FixtureLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Writes colours across every fixture of the standard layout.
///
/// This is the only path by which a colour reaches the frame; each write ends
/// with a master dimmer recompute.
pub struct ChannelMapper;

impl ChannelMapper {
    /// Write the same RGB triple to all 16 fixtures
    pub fn apply_rgb(frame: &mut DmxFrame, color: Rgb) {
        let layout = FixtureLayout::STANDARD;
        for channel in [ColorChannel::Green, ColorChannel::Blue, ColorChannel::Red] {
            Self::write(frame, &layout, channel, color.get(channel));
        }
        MasterDimmer::recompute(frame);
    }

    /// Write one colour to all 16 fixtures, leaving the other two untouched
    pub fn apply_channel(frame: &mut DmxFrame, channel: ColorChannel, value: u8) {
        Self::write(frame, &FixtureLayout::STANDARD, channel, value);
        MasterDimmer::recompute(frame);
    }

    fn write(frame: &mut DmxFrame, layout: &FixtureLayout, channel: ColorChannel, value: u8) {
        for address in layout.addresses(channel) {
            frame.set_channel(address, value);
        }
    }
}
