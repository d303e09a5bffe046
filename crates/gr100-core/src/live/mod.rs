//! Live Count Metrics
//!
//! Turns the raw pulse counters returned by the live-counts command into
//! instantaneous and rolling count rates.

mod ring;

pub use ring::RingBuffer;

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::protocol::LIVE_FRAME_LEN;

/// Sizes, in samples, of the rolling windows
pub const WINDOW_SIZES: [usize; 3] = [5, 15, 60];

/// Milliseconds per minute, the scale applied to stored counts
const MS_PER_MINUTE: u64 = 60_000;

/// The three detector counters of one live frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiveCounts {
    /// The three little-endian counters of the frame
    pub counters: [u16; 3],
}

impl LiveCounts {
    /// Decode an 8-byte live frame; the last two bytes are not used
    pub fn from_frame(frame: &[u8; LIVE_FRAME_LEN]) -> Self {
        Self {
            counters: [
                LittleEndian::read_u16(&frame[0..2]),
                LittleEndian::read_u16(&frame[2..4]),
                LittleEndian::read_u16(&frame[4..6]),
            ],
        }
    }

    /// Sum of all counters
    pub fn total(&self) -> u32 {
        self.counters.iter().map(|&c| u32::from(c)).sum()
    }
}

/// One poll as stored in the rolling windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingSample {
    /// Time the frame took to arrive
    pub elapsed_ms: u64,
    /// Counts multiplied by 60000, ready for a per-minute division
    pub counts_scaled: u64,
}

impl TimingSample {
    /// Sample for `counts` received over `elapsed_ms`
    pub fn new(counts: u32, elapsed_ms: u64) -> Self {
        Self {
            elapsed_ms,
            counts_scaled: u64::from(counts) * MS_PER_MINUTE,
        }
    }
}

/// Rolling count rate over the last `window` polls
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingCpm {
    /// Window size in samples
    pub window: usize,
    /// Samples actually in the window
    pub samples: usize,
    /// Counts per minute; NaN when the window holds no time
    pub cpm: f64,
}

/// Result of one live poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveReading {
    /// Wall-clock time the reading was taken
    pub timestamp: DateTime<Local>,
    /// Counts summed over the three counters
    pub counts: u32,
    /// Time the frame took to arrive
    pub elapsed_ms: u64,
    /// Counts per second; NaN when `elapsed_ms` is zero
    pub cps: f64,
    /// Counts per minute; NaN when `elapsed_ms` is zero
    pub cpm: f64,
    /// Rolling rates over the 5, 15 and 60 sample windows
    pub rolling: [RollingCpm; 3],
}

impl LiveReading {
    /// False for anomalous samples whose rates could not be computed
    pub fn is_valid(&self) -> bool {
        self.elapsed_ms > 0
    }
}

/// Rolling-average state for a live stream
#[derive(Debug, Clone)]
pub struct LiveMetrics {
    windows: [RingBuffer<TimingSample>; 3],
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveMetrics {
    /// Empty windows, allocated at full capacity
    pub fn new() -> Self {
        Self {
            windows: WINDOW_SIZES.map(RingBuffer::new),
        }
    }

    /// Record a poll taken now
    pub fn record(&mut self, counts: u32, elapsed_ms: u64) -> LiveReading {
        self.record_at(Local::now(), counts, elapsed_ms)
    }

    /// Record a poll with an explicit wall-clock timestamp.
    ///
    /// A zero `elapsed_ms` is a protocol anomaly: the reading is returned
    /// with NaN rates and the windows are left untouched.
    pub fn record_at(
        &mut self,
        timestamp: DateTime<Local>,
        counts: u32,
        elapsed_ms: u64,
    ) -> LiveReading {
        let (cps, cpm) = if elapsed_ms == 0 {
            tracing::warn!(counts, "live frame arrived with zero elapsed time, sample skipped");
            (f64::NAN, f64::NAN)
        } else {
            let sample = TimingSample::new(counts, elapsed_ms);
            for window in &mut self.windows {
                window.push(sample);
            }
            let cps = f64::from(counts) * 1000.0 / elapsed_ms as f64;
            (cps, 60.0 * cps)
        };

        LiveReading {
            timestamp,
            counts,
            elapsed_ms,
            cps,
            cpm,
            rolling: self.rolling(),
        }
    }

    /// Current rolling rates for every window
    pub fn rolling(&self) -> [RollingCpm; 3] {
        let mut out = [RollingCpm {
            window: 0,
            samples: 0,
            cpm: f64::NAN,
        }; 3];
        for (slot, window) in out.iter_mut().zip(&self.windows) {
            *slot = RollingCpm {
                window: window.capacity(),
                samples: window.len(),
                cpm: rolling_cpm(window),
            };
        }
        out
    }

    /// The stored samples of one window, oldest first
    pub fn window(&self, index: usize) -> Option<&RingBuffer<TimingSample>> {
        self.windows.get(index)
    }

    /// Forget all samples
    pub fn reset(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
    }
}

/// Sum of scaled counts over sum of elapsed time; NaN for an empty window
pub fn rolling_cpm(window: &RingBuffer<TimingSample>) -> f64 {
    let (counts, elapsed) = window
        .iter()
        .fold((0u64, 0u64), |(c, e), s| (c + s.counts_scaled, e + s.elapsed_ms));
    if elapsed == 0 {
        f64::NAN
    } else {
        counts as f64 / elapsed as f64
    }
}
