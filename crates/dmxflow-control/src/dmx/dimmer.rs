//! Master dimmer policy

use super::{layout::FixtureLayout, DmxFrame};

/// Derives the master dimmer (channel 1) from fixture 0.
///
/// The dimmer is fully open whenever fixture 0 shows any colour and closed
/// otherwise. Only fixture 0 is inspected; the other fixtures always carry
/// the same colour through [`ChannelMapper`](super::ChannelMapper).
pub struct MasterDimmer;

impl MasterDimmer {
    /// DMX address of the master dimmer
    pub const CHANNEL: usize = 1;

    /// Value the dimmer should have for the current frame
    pub fn value_for(frame: &DmxFrame) -> u8 {
        let fixture = FixtureLayout::STANDARD.read_fixture(frame, 0);
        if fixture.r > 0 || fixture.g > 0 || fixture.b > 0 {
            255
        } else {
            0
        }
    }

    /// Update the dimmer slot in place. Idempotent.
    pub fn recompute(frame: &mut DmxFrame) {
        let value = Self::value_for(frame);
        frame.set_channel(Self::CHANNEL, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_fixture_closes_dimmer() {
        let mut frame = DmxFrame::new();
        frame.set_channel(1, 255);
        MasterDimmer::recompute(&mut frame);
        assert_eq!(frame.get(1), 0);
    }

    #[test]
    fn test_any_colour_opens_dimmer() {
        for address in [2, 3, 4] {
            let mut frame = DmxFrame::new();
            frame.set_channel(address, 1);
            MasterDimmer::recompute(&mut frame);
            assert_eq!(frame.get(1), 255, "address {}", address);
        }
    }

    #[test]
    fn test_only_fixture_zero_counts() {
        let mut frame = DmxFrame::new();
        frame.set_channel(5, 255); // fixture 1 green
        MasterDimmer::recompute(&mut frame);
        assert_eq!(frame.get(1), 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut frame = DmxFrame::new();
        frame.set_channel(4, 9);
        MasterDimmer::recompute(&mut frame);
        let once = frame.clone();
        MasterDimmer::recompute(&mut frame);
        assert_eq!(frame, once);
    }
}
