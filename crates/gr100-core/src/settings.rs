//! Device Settings
//!
//! Decodes the 31-byte configuration block returned by the settings
//! command.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::protocol::SETTINGS_FRAME_LEN;
use crate::records::ascii_field;
use crate::time::DeviceTime;

/// Dose-rate units the display can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DoseUnit {
    /// Gy/h (bit 4)
    GrayPerHour,
    /// R/h (bit 5)
    RoentgenPerHour,
    /// Sv/h (bit 6)
    SievertPerHour,
}

impl DoseUnit {
    /// Unit symbol as printed on the device
    pub fn symbol(&self) -> &'static str {
        match self {
            DoseUnit::GrayPerHour => "Gy/h",
            DoseUnit::RoentgenPerHour => "R/h",
            DoseUnit::SievertPerHour => "Sv/h",
        }
    }
}

/// Status byte (byte 0) of the settings block.
///
/// Unit bits are tested independently. The device is meant to set exactly
/// one of them but nothing here assumes it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    /// Status byte as read (byte 0)
    pub raw: u8,
}

impl StatusFlags {
    const VIBRATOR: u8 = 1 << 0;
    const BUZZER: u8 = 1 << 1;
    const BACKLIGHT: u8 = 1 << 2;
    const BEEP: u8 = 1 << 3;
    const UNIT_GRAY: u8 = 1 << 4;
    const UNIT_ROENTGEN: u8 = 1 << 5;
    const UNIT_SIEVERT: u8 = 1 << 6;

    /// Vibration alert enabled
    pub fn vibrator(&self) -> bool {
        self.raw & Self::VIBRATOR != 0
    }

    /// Audible alarm enabled
    pub fn buzzer(&self) -> bool {
        self.raw & Self::BUZZER != 0
    }

    /// Display backlight enabled
    pub fn backlight(&self) -> bool {
        self.raw & Self::BACKLIGHT != 0
    }

    /// Key beep enabled
    pub fn beep(&self) -> bool {
        self.raw & Self::BEEP != 0
    }

    /// Every unit whose bit is set, in bit order
    pub fn units(&self) -> Vec<DoseUnit> {
        [
            (Self::UNIT_GRAY, DoseUnit::GrayPerHour),
            (Self::UNIT_ROENTGEN, DoseUnit::RoentgenPerHour),
            (Self::UNIT_SIEVERT, DoseUnit::SievertPerHour),
        ]
        .into_iter()
        .filter(|(bit, _)| self.raw & bit != 0)
        .map(|(_, unit)| unit)
        .collect()
    }

    /// True when the unit bits do not select exactly one unit
    pub fn units_inconsistent(&self) -> bool {
        self.units().len() != 1
    }
}

/// Snapshot of the device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Feature and unit bits
    pub status: StatusFlags,
    /// LCD contrast (byte 3)
    pub contrast: u8,
    /// Neutron alarm threshold (bytes 8-9)
    pub neutron_alarm: u16,
    /// Gamma alarm threshold (bytes 10-11)
    pub gamma_alarm: u16,
    /// Temperature in hundredths of a degree Celsius
    pub temperature_cc: i16,
    /// Battery voltage in centivolts
    pub battery_cv: i16,
    /// Firmware revision, three ASCII characters
    pub firmware: String,
    /// Device clock (bytes 24-29)
    pub clock: DeviceTime,
}

impl Settings {
    /// Decode a settings frame
    pub fn decode(frame: &[u8; SETTINGS_FRAME_LEN]) -> Self {
        let mut clock = [0u8; 6];
        clock.copy_from_slice(&frame[24..30]);

        Self {
            status: StatusFlags { raw: frame[0] },
            contrast: frame[3],
            neutron_alarm: LittleEndian::read_u16(&frame[8..10]),
            gamma_alarm: LittleEndian::read_u16(&frame[10..12]),
            temperature_cc: LittleEndian::read_i16(&frame[12..14]),
            battery_cv: LittleEndian::read_i16(&frame[14..16]),
            firmware: ascii_field(&frame[20..23]),
            clock: DeviceTime::from_raw(clock),
        }
    }

    /// Temperature in degrees Celsius
    pub fn temperature(&self) -> f64 {
        f64::from(self.temperature_cc) / 100.0
    }

    /// Battery voltage in volts
    pub fn battery_voltage(&self) -> f64 {
        f64::from(self.battery_cv) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_frame() -> [u8; SETTINGS_FRAME_LEN] {
        let mut f = [0u8; SETTINGS_FRAME_LEN];
        f[0] = 0b0001_0011;
        f[3] = 9;
        f[8..10].copy_from_slice(&150u16.to_le_bytes());
        f[10..12].copy_from_slice(&2000u16.to_le_bytes());
        f[12..14].copy_from_slice(&(-525i16).to_le_bytes());
        f[14..16].copy_from_slice(&298i16.to_le_bytes());
        f[20..23].copy_from_slice(b"3.1");
        f[24..30].copy_from_slice(&[13, 7, 14, 18, 45, 10]);
        f
    }

    #[test]
    fn test_status_bits() {
        let settings = Settings::decode(&sample_frame());
        let status = settings.status;
        assert!(status.vibrator());
        assert!(status.buzzer());
        assert!(!status.backlight());
        assert!(!status.beep());
        assert_eq!(status.units(), vec![DoseUnit::GrayPerHour]);
        assert!(!status.units_inconsistent());
    }

    #[test]
    fn test_inconsistent_units_reported() {
        let status = StatusFlags { raw: 0b0110_0000 };
        assert_eq!(
            status.units(),
            vec![DoseUnit::RoentgenPerHour, DoseUnit::SievertPerHour]
        );
        assert!(status.units_inconsistent());
        assert!(StatusFlags { raw: 0 }.units_inconsistent());
    }

    #[test]
    fn test_fields() {
        let settings = Settings::decode(&sample_frame());
        assert_eq!(settings.contrast, 9);
        assert_eq!(settings.neutron_alarm, 150);
        assert_eq!(settings.gamma_alarm, 2000);
        assert_eq!(settings.temperature_cc, -525);
        assert!((settings.temperature() + 5.25).abs() < 1e-9);
        assert!((settings.battery_voltage() - 2.98).abs() < 1e-9);
        assert_eq!(settings.firmware, "3.1");
        assert_eq!(settings.clock.to_string(), "2013/07/14 18:45:10");
    }
}
