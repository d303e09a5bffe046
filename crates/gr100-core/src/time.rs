//! Device timestamps
//!
//! The device stores dates as six raw bytes: year offset from 2000, month,
//! day, hour, minute, second.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Year the device's year byte counts from
pub const BASE_YEAR: u16 = 2000;

/// A timestamp as reported by the device clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceTime {
    /// Full year, 2000 plus the year byte
    pub year: u16,
    /// Month as reported, normally 1-12
    pub month: u8,
    /// Day of month
    pub day: u8,
    /// Hour, 24-hour clock
    pub hour: u8,
    /// Minute
    pub minute: u8,
    /// Second
    pub second: u8,
}

impl DeviceTime {
    /// Decode from the six raw clock bytes. Out-of-range field values are
    /// kept as reported.
    pub fn from_raw(raw: [u8; 6]) -> Self {
        Self {
            year: BASE_YEAR + u16::from(raw[0]),
            month: raw[1],
            day: raw[2],
            hour: raw[3],
            minute: raw[4],
            second: raw[5],
        }
    }

    /// Convert to a calendar date-time, if the fields form a valid one
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))?
            .and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
    }
}

impl fmt::Display for DeviceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_display() {
        let time = DeviceTime::from_raw([13, 4, 21, 9, 5, 59]);
        assert_eq!(time.year, 2013);
        assert_eq!(time.to_string(), "2013/04/21 09:05:59");
        assert!(time.to_naive().is_some());
    }

    #[test]
    fn test_invalid_calendar_fields() {
        let time = DeviceTime::from_raw([0, 13, 40, 25, 0, 0]);
        assert_eq!(time.month, 13);
        assert!(time.to_naive().is_none());
    }

    #[test]
    fn test_year_byte_full_range() {
        let time = DeviceTime::from_raw([u8::MAX, 1, 1, 0, 0, 0]);
        assert_eq!(time.year, 2255);
        assert_eq!(time.to_string(), "2255/01/01 00:00:00");
    }
}
