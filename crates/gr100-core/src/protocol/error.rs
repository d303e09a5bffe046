//! Protocol errors

use thiserror::Error;

use super::Command;

/// Errors that can occur during protocol communication
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Port could not be opened or configured
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// Session has already released its channel
    #[error("Not connected to device")]
    NotConnected,

    /// Reply to a command was not the handshake byte
    #[error("Device did not acknowledge {command} command")]
    HandshakeFailed {
        /// Command that went unacknowledged
        command: Command,
    },

    /// Stream ended inside a frame
    #[error("Short read: got {received} of {expected} bytes before end of stream")]
    ShortRead {
        /// Frame length
        expected: usize,
        /// Bytes read before the end
        received: usize,
    },

    /// Read timed out inside a frame
    #[error("Read timeout: got {received} of {expected} bytes")]
    Timeout {
        /// Frame length
        expected: usize,
        /// Bytes read before the timeout
        received: usize,
    },

    /// Other I/O failure on the channel
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
