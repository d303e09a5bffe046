//! Byte channel abstraction
//!
//! The protocol engine talks to the device through a [`Channel`]: a blocking
//! duplex byte stream whose read timeout can be changed per operation.

use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Abstraction for the device link
pub trait Channel: Read + Write + Send {
    /// Set the timeout for subsequent blocking reads
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout)
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout)
    }
}

/// Serial port wrapper implementing Channel
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Wrap an open, configured port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Name of the underlying port, if the driver knows it
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Channel for SerialChannel {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}
