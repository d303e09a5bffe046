//! # GR-100 Core Library
//!
//! Protocol and record engine for GR-100 handheld radiation detectors.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The request/handshake/frame exchange over a serial channel
//! - Decoding of the diagnostic, alarm and dose logs
//! - Live counts with instantaneous and rolling count rates
//! - Gamma spectrum acquisition
//! - Device settings decoding
//!
//! Port discovery and report formatting are left to the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gr100_core::protocol::{open_port, Session, SessionConfig};
//!
//! let channel = open_port("/dev/ttyUSB0")?;
//! let mut session = Session::new(channel, SessionConfig::default());
//!
//! for record in session.log()?.alarms() {
//!     println!("{:?}", record);
//! }
//!
//! session.live_stream(|reading| println!("{:.0} cpm", reading.cpm))?;
//! session.close()?;
//! ```

pub mod live;
pub mod protocol;
pub mod records;
pub mod settings;
pub mod spectrum;
pub mod time;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::live::{LiveMetrics, LiveReading, RingBuffer};
    pub use crate::protocol::{Channel, Command, ProtocolError, Session, SessionConfig};
    pub use crate::records::{DeviceLog, LogPhase, LogView, Record};
    pub use crate::settings::Settings;
    pub use crate::spectrum::Spectrum;
    pub use crate::time::DeviceTime;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
