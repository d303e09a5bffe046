//! Gamma spectrum
//!
//! The device accumulates each energy channel for a fixed number of seconds
//! and sends one 4-byte frame per channel.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Serializer};

use crate::protocol::SPECTRUM_FRAME_LEN;

/// Number of energy channels in one acquisition
pub const CHANNEL_COUNT: usize = 41;

/// Decode the count from one channel frame; bytes 2 and 3 are not used
pub fn channel_count(frame: &[u8; SPECTRUM_FRAME_LEN]) -> u16 {
    LittleEndian::read_u16(&frame[0..2])
}

/// Encode the seconds-per-channel parameter, low byte first
pub fn encode_seconds_per_channel(seconds: u16) -> [u8; 2] {
    let mut out = [0u8; 2];
    LittleEndian::write_u16(&mut out, seconds);
    out
}

/// Counts of one acquisition, channel 0 first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spectrum {
    /// Accumulation time per channel in seconds
    pub seconds_per_channel: u16,
    /// Count per channel
    #[serde(serialize_with = "serialize_channels")]
    pub channels: [u16; CHANNEL_COUNT],
}

// serde stops at 32-element arrays
fn serialize_channels<S: Serializer>(
    channels: &[u16; CHANNEL_COUNT],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(channels.iter())
}

impl Spectrum {
    /// Total counts over all channels
    pub fn total(&self) -> u64 {
        self.channels.iter().map(|&c| u64::from(c)).sum()
    }

    /// Index and count of the busiest channel
    pub fn peak(&self) -> (usize, u16) {
        self.channels
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0), |best, (i, c)| if c > best.1 { (i, c) } else { best })
    }

    /// Count rate of a channel in counts per second.
    ///
    /// A zero accumulation time gives a non-finite value.
    pub fn rate(&self, channel: usize) -> Option<f64> {
        let count = *self.channels.get(channel)?;
        Some(f64::from(count) / f64::from(self.seconds_per_channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_count_is_unsigned() {
        assert_eq!(channel_count(&[0x34, 0x12, 0xFF, 0xFF]), 0x1234);
        assert_eq!(channel_count(&[0xFF, 0xFF, 0x00, 0x00]), 0xFFFF);
    }

    #[test]
    fn test_seconds_parameter_low_byte_first() {
        assert_eq!(encode_seconds_per_channel(0x0102), [0x02, 0x01]);
        assert_eq!(encode_seconds_per_channel(5), [5, 0]);
    }

    #[test]
    fn test_summary() {
        let mut channels = [0u16; CHANNEL_COUNT];
        channels[3] = 7;
        channels[20] = 90;
        channels[40] = 3;
        let spectrum = Spectrum {
            seconds_per_channel: 2,
            channels,
        };
        assert_eq!(spectrum.total(), 100);
        assert_eq!(spectrum.peak(), (20, 90));
        assert_eq!(spectrum.rate(20), Some(45.0));
        assert_eq!(spectrum.rate(41), None);
    }

    #[test]
    fn test_serializes_all_channels() {
        let mut channels = [0u16; CHANNEL_COUNT];
        channels[40] = 12;
        let spectrum = Spectrum {
            seconds_per_channel: 3,
            channels,
        };
        let json = serde_json::to_value(&spectrum).expect("serialize");
        let serialized = json["channels"].as_array().expect("channel list");
        assert_eq!(serialized.len(), CHANNEL_COUNT);
        assert_eq!(serialized[40], 12);
        assert_eq!(json["seconds_per_channel"], 3);
    }
}
