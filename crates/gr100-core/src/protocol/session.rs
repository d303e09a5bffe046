//! Session management
//!
//! A [`Session`] owns the channel for one run and executes commands
//! strictly one at a time: write the command, wait for the handshake, then
//! pull fixed-size frames. Whatever is still on the line when the session
//! ends, by [`Session::close`] or by being dropped, is drained.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::{
    frame::{drain, read_ack, read_frame},
    Channel, Command, ProtocolError, DEFAULT_LIVE_ITERATIONS, DEFAULT_TIMEOUT_MS,
    LIVE_FRAME_LEN, LOG_FRAME_LEN, SETTINGS_FRAME_LEN, SPECTRUM_FRAME_LEN,
};
use crate::live::{LiveCounts, LiveMetrics, LiveReading};
use crate::records::{decode, is_stop_sentinel, DeviceLog, LogPhase, Record};
use crate::settings::Settings;
use crate::spectrum::{channel_count, encode_seconds_per_channel, Spectrum, CHANNEL_COUNT};

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Wait for the handshake byte after a command
    pub ack_timeout_ms: u64,
    /// Wait for each log frame
    pub log_timeout_ms: u64,
    /// Wait for each live frame; also the floor for spectrum channel reads
    pub live_timeout_ms: u64,
    /// Wait for the settings block
    pub settings_timeout_ms: u64,
    /// Quiet period that ends a stale-data drain
    pub drain_window_ms: u64,
    /// Number of polls in a live stream
    pub live_iterations: u32,
    /// Accumulation time per spectrum channel
    pub spectrum_seconds_per_channel: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: 2000,
            log_timeout_ms: DEFAULT_TIMEOUT_MS,
            live_timeout_ms: DEFAULT_TIMEOUT_MS,
            settings_timeout_ms: DEFAULT_TIMEOUT_MS,
            drain_window_ms: 500,
            live_iterations: DEFAULT_LIVE_ITERATIONS,
            spectrum_seconds_per_channel: 1,
        }
    }
}

impl SessionConfig {
    /// Read timeout for one spectrum channel: twice the accumulation time,
    /// never below the live timeout
    pub fn spectrum_timeout(&self, seconds_per_channel: u16) -> Duration {
        let accumulate_ms = u64::from(seconds_per_channel) * 2 * 1000;
        Duration::from_millis(accumulate_ms.max(self.live_timeout_ms))
    }
}

/// Exclusive command session with one device
pub struct Session<C: Channel> {
    /// Device link, owned until the session closes
    channel: Option<C>,
    /// Session configuration
    config: SessionConfig,
    /// Set once the stale-data drain has run
    primed: bool,
    /// Log fetched by the first call to [`Session::log`]
    log: Option<DeviceLog>,
    /// Metrics: cumulative bytes sent & received
    tx_bytes: u64,
    rx_bytes: u64,
}

impl<C: Channel> Session<C> {
    /// Start a session on an already-open channel
    pub fn new(channel: C, config: SessionConfig) -> Self {
        Self {
            channel: Some(channel),
            config,
            primed: false,
            log: None,
            tx_bytes: 0,
            rx_bytes: 0,
        }
    }

    /// Get the session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get cumulative tx/rx byte counters
    pub fn counters(&self) -> (u64, u64) {
        (self.tx_bytes, self.rx_bytes)
    }

    /// End the session: drain trailing bytes and hand the channel back
    pub fn close(mut self) -> Result<C, ProtocolError> {
        self.drain_stale();
        tracing::debug!(tx = self.tx_bytes, rx = self.rx_bytes, "session closed");
        self.channel.take().ok_or(ProtocolError::NotConnected)
    }

    fn channel_mut(&mut self) -> Result<&mut C, ProtocolError> {
        self.channel.as_mut().ok_or(ProtocolError::NotConnected)
    }

    fn drain_stale(&mut self) -> usize {
        let window = Duration::from_millis(self.config.drain_window_ms);
        match self.channel.as_mut() {
            Some(channel) => drain(channel, window),
            None => 0,
        }
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), ProtocolError> {
        self.channel_mut()?.set_timeout(timeout)?;
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let channel = self.channel_mut()?;
        channel.write_all(bytes)?;
        channel.flush()?;
        self.tx_bytes += bytes.len() as u64;
        Ok(())
    }

    fn read<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let frame = read_frame::<N, C>(self.channel_mut()?)?;
        self.rx_bytes += N as u64;
        Ok(frame)
    }

    /// Send a command and wait for its handshake.
    ///
    /// The first command of a session is preceded by a drain of whatever a
    /// previous, aborted session left on the line.
    fn command(&mut self, command: Command) -> Result<(), ProtocolError> {
        if !self.primed {
            self.drain_stale();
            self.primed = true;
        }

        tracing::debug!(%command, "sending command");
        self.send(&[command.byte()])?;

        if command.expects_ack() {
            self.set_timeout(Duration::from_millis(self.config.ack_timeout_ms))?;
            let acked = read_ack(self.channel_mut()?)?;
            self.rx_bytes += 1;
            if !acked {
                tracing::warn!(%command, "device did not acknowledge command");
                return Err(ProtocolError::HandshakeFailed { command });
            }
        }
        Ok(())
    }

    /// Fetch the device log, or return the one already fetched.
    ///
    /// Both phases are attempted even if the first one fails. The call
    /// fails only when neither phase could be read.
    pub fn log(&mut self) -> Result<&DeviceLog, ProtocolError> {
        let log = match self.log.take() {
            Some(log) => log,
            None => self.fetch_log()?,
        };
        let log: &DeviceLog = self.log.insert(log);
        Ok(log)
    }

    fn fetch_log(&mut self) -> Result<DeviceLog, ProtocolError> {
        let mut log = DeviceLog::new();
        let mut last_error = None;
        let mut failed = 0;

        for phase in LogPhase::ALL {
            if last_error.is_some() {
                self.drain_stale();
            }

            let mut records = Vec::new();
            let result = self.read_phase_into(phase, &mut records);
            log.extend(records);

            if let Err(e) = result {
                tracing::warn!(?phase, error = %e, "log phase aborted");
                log.mark_incomplete(phase);
                failed += 1;
                last_error = Some(e);
            }
        }

        match last_error {
            Some(e) if failed == LogPhase::ALL.len() => Err(e),
            _ => {
                tracing::debug!(records = log.len(), "device log fetched");
                Ok(log)
            }
        }
    }

    /// Read a single log phase up to its stop sentinel
    pub fn read_log_phase(&mut self, phase: LogPhase) -> Result<Vec<Record>, ProtocolError> {
        let mut records = Vec::new();
        self.read_phase_into(phase, &mut records)?;
        Ok(records)
    }

    fn read_phase_into(
        &mut self,
        phase: LogPhase,
        records: &mut Vec<Record>,
    ) -> Result<(), ProtocolError> {
        self.command(phase.command())?;
        self.set_timeout(Duration::from_millis(self.config.log_timeout_ms))?;

        loop {
            let frame = self.read::<LOG_FRAME_LEN>()?;
            if is_stop_sentinel(&frame) {
                break;
            }
            let record = decode(&frame, phase);
            tracing::debug!(?phase, tag = record.tag(), label = record.label(), "log record");
            records.push(record);
        }
        Ok(())
    }

    /// Poll live counts `live_iterations` times, handing each reading to `sink`.
    ///
    /// Returns the rolling-average state at the end of the stream. A failed
    /// handshake or read stops the stream and is returned as the error;
    /// readings already delivered stay delivered.
    pub fn live_stream<F>(&mut self, sink: F) -> Result<LiveMetrics, ProtocolError>
    where
        F: FnMut(&LiveReading),
    {
        self.live_stream_for(self.config.live_iterations, sink)
    }

    /// Poll live counts a given number of times
    pub fn live_stream_for<F>(
        &mut self,
        iterations: u32,
        mut sink: F,
    ) -> Result<LiveMetrics, ProtocolError>
    where
        F: FnMut(&LiveReading),
    {
        let mut metrics = LiveMetrics::new();

        for iteration in 0..iterations {
            self.command(Command::LiveCounts)?;
            self.set_timeout(Duration::from_millis(self.config.live_timeout_ms))?;

            let start = Instant::now();
            let frame = self.read::<LIVE_FRAME_LEN>()?;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            let counts = LiveCounts::from_frame(&frame);
            let reading = metrics.record(counts.total(), elapsed_ms);
            tracing::debug!(
                iteration,
                counts = reading.counts,
                elapsed_ms,
                cpm = reading.cpm,
                "live reading"
            );
            sink(&reading);
        }

        Ok(metrics)
    }

    /// Acquire a spectrum with the configured seconds per channel
    pub fn spectrum<F>(&mut self, sink: F) -> Result<Spectrum, ProtocolError>
    where
        F: FnMut(usize, u16),
    {
        self.spectrum_with(self.config.spectrum_seconds_per_channel, sink)
    }

    /// Acquire a spectrum, handing each channel count to `sink` as it arrives.
    ///
    /// The end-of-spectrum byte is only sent after all channels were read.
    pub fn spectrum_with<F>(
        &mut self,
        seconds_per_channel: u16,
        mut sink: F,
    ) -> Result<Spectrum, ProtocolError>
    where
        F: FnMut(usize, u16),
    {
        self.command(Command::StartSpectrum)?;
        self.send(&encode_seconds_per_channel(seconds_per_channel))?;
        self.set_timeout(self.config.spectrum_timeout(seconds_per_channel))?;

        let mut channels = [0u16; CHANNEL_COUNT];
        for (index, slot) in channels.iter_mut().enumerate() {
            let frame = self.read::<SPECTRUM_FRAME_LEN>()?;
            *slot = channel_count(&frame);
            tracing::debug!(channel = index, count = *slot, "spectrum channel");
            sink(index, *slot);
        }

        self.command(Command::EndSpectrum)?;

        Ok(Spectrum {
            seconds_per_channel,
            channels,
        })
    }

    /// Read the device configuration
    pub fn settings(&mut self) -> Result<Settings, ProtocolError> {
        self.command(Command::Settings)?;
        self.set_timeout(Duration::from_millis(self.config.settings_timeout_ms))?;
        let frame = self.read::<SETTINGS_FRAME_LEN>()?;
        let settings = Settings::decode(&frame);
        if settings.status.units_inconsistent() {
            tracing::warn!(
                status = format_args!("{:#010b}", settings.status.raw),
                "settings report an inconsistent display unit selection"
            );
        }
        Ok(settings)
    }
}

impl<C: Channel> Drop for Session<C> {
    fn drop(&mut self) {
        if self.channel.is_some() {
            let drained = self.drain_stale();
            tracing::debug!(drained, "session dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.live_iterations, 100);
        assert_eq!(config.log_timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_spectrum_timeout_at_least_twice_accumulation() {
        let config = SessionConfig::default();
        assert_eq!(config.spectrum_timeout(10), Duration::from_secs(20));
        assert_eq!(
            config.spectrum_timeout(1),
            Duration::from_millis(config.live_timeout_ms)
        );
    }
}
