//! Serial Protocol Communication
//!
//! Implements the GR-100 request/response protocol: a one-byte command,
//! a one-byte handshake, then fixed-size little-endian frames.

pub mod commands;
mod error;
pub mod frame;
pub mod serial;
mod session;
mod stream;

pub use commands::Command;
pub use error::ProtocolError;
pub use frame::{drain, read_ack, read_frame};
pub use serial::{configure_port, open_port};
pub use session::{Session, SessionConfig};
pub use stream::{Channel, SerialChannel};

/// Line speed of the device's serial interface
pub const DEFAULT_BAUD_RATE: u32 = 2400;

/// Default timeout for responses in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Handshake byte sent by the device when it accepts a command
pub const ACK_BYTE: u8 = 0xAA;

/// Size of a diagnostic or dose log frame
pub const LOG_FRAME_LEN: usize = 16;

/// Size of a live-counts frame
pub const LIVE_FRAME_LEN: usize = 8;

/// Size of a spectrum channel frame
pub const SPECTRUM_FRAME_LEN: usize = 4;

/// Size of the settings block
pub const SETTINGS_FRAME_LEN: usize = 31;

/// Frame that ends a log dump
pub const STOP_SENTINEL: [u8; LOG_FRAME_LEN] = [ACK_BYTE; LOG_FRAME_LEN];

/// Default number of polls in a live stream
pub const DEFAULT_LIVE_ITERATIONS: u32 = 100;
