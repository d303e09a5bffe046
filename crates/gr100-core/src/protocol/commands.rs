//! Protocol commands
//!
//! Single-byte commands understood by the device. Every command except
//! [`Command::EndSpectrum`] is answered with the handshake byte before any
//! payload is sent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol commands for device communication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Dump the diagnostic/alarm event log (0x50)
    DiagnosticLog,

    /// Dump the accumulated dose log (0x79)
    DoseLog,

    /// Read the live pulse counters (0x43)
    LiveCounts,

    /// Start a gamma spectrum acquisition (0x53)
    StartSpectrum,

    /// Tell the device the spectrum has been consumed (0x5A)
    EndSpectrum,

    /// Read the configuration block (0x4A)
    Settings,
}

impl Command {
    /// Get the command byte sent on the wire
    pub fn byte(&self) -> u8 {
        match self {
            Command::DiagnosticLog => 0x50,
            Command::DoseLog => 0x79,
            Command::LiveCounts => 0x43,
            Command::StartSpectrum => 0x53,
            Command::EndSpectrum => 0x5A,
            Command::Settings => 0x4A,
        }
    }

    /// Check if the device answers this command with a handshake byte
    pub fn expects_ack(&self) -> bool {
        !matches!(self, Command::EndSpectrum)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::DiagnosticLog => "diagnostic-log",
            Command::DoseLog => "dose-log",
            Command::LiveCounts => "live-counts",
            Command::StartSpectrum => "start-spectrum",
            Command::EndSpectrum => "end-spectrum",
            Command::Settings => "settings",
        };
        write!(f, "{} (0x{:02X})", name, self.byte())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes() {
        assert_eq!(Command::DiagnosticLog.byte(), 0x50);
        assert_eq!(Command::DoseLog.byte(), 0x79);
        assert_eq!(Command::LiveCounts.byte(), 0x43);
        assert_eq!(Command::StartSpectrum.byte(), 0x53);
        assert_eq!(Command::EndSpectrum.byte(), 0x5A);
        assert_eq!(Command::Settings.byte(), 0x4A);
    }

    #[test]
    fn test_command_ack() {
        assert!(Command::DiagnosticLog.expects_ack());
        assert!(Command::StartSpectrum.expects_ack());
        assert!(!Command::EndSpectrum.expects_ack());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::Settings.to_string(), "settings (0x4A)");
    }
}
