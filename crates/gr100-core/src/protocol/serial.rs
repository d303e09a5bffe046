//! Serial port handling
//!
//! Opens an already-known port with the device's fixed line settings.
//! Port discovery is left to the caller.

use serialport::SerialPort;
use std::time::Duration;

use super::{ProtocolError, SerialChannel, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT_MS};

/// Open a serial port and wrap it as a [`SerialChannel`]
pub fn open_port(name: &str) -> Result<SerialChannel, ProtocolError> {
    let mut port = serialport::new(name, DEFAULT_BAUD_RATE)
        .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
        .open()
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    configure_port(port.as_mut())?;
    tracing::debug!(port = name, baud = DEFAULT_BAUD_RATE, "serial port opened");
    Ok(SerialChannel::new(port))
}

/// Configure a serial port for device communication
pub fn configure_port(port: &mut dyn SerialPort) -> Result<(), ProtocolError> {
    // 2400 8N1, no flow control
    port.set_baud_rate(DEFAULT_BAUD_RATE)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    port.set_data_bits(serialport::DataBits::Eight)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    port.set_parity(serialport::Parity::None)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    port.set_stop_bits(serialport::StopBits::One)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    port.set_flow_control(serialport::FlowControl::None)
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
    Ok(())
}
