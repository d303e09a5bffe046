//! Typed log records
//!
//! Every 16-byte log frame decodes into exactly one [`Record`]. The tag
//! byte at offset 15 picks the shape.

use serde::Serialize;

use super::LogPhase;
use crate::protocol::LOG_FRAME_LEN;
use crate::time::DeviceTime;

/// Tag byte of the prologue frame that opens each log dump
pub const PROLOGUE_TAG: u8 = 0x30;
/// Tag byte of an alarm record
pub const ALARM_TAG: u8 = b'A';
/// Tag byte of a dose record
pub const DOSE_TAG: u8 = b'D';

/// Events that log battery voltage and current drain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PowerEvent {
    /// Power-on reset ('P')
    PowerReset,
    /// Software reset ('S')
    SoftReset,
    /// Clock was set ('T')
    TimeSet,
    /// Watchdog reset ('W')
    WatchdogReset,
    /// Battery was replaced ('B')
    NewBattery,
}

impl PowerEvent {
    /// Look up the event for a tag byte
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'P' => Some(PowerEvent::PowerReset),
            b'S' => Some(PowerEvent::SoftReset),
            b'T' => Some(PowerEvent::TimeSet),
            b'W' => Some(PowerEvent::WatchdogReset),
            b'B' => Some(PowerEvent::NewBattery),
            _ => None,
        }
    }

    /// Tag byte identifying this event on the wire
    pub fn tag(&self) -> u8 {
        match self {
            PowerEvent::PowerReset => b'P',
            PowerEvent::SoftReset => b'S',
            PowerEvent::TimeSet => b'T',
            PowerEvent::WatchdogReset => b'W',
            PowerEvent::NewBattery => b'B',
        }
    }

    /// Human-readable name of the event
    pub fn label(&self) -> &'static str {
        match self {
            PowerEvent::PowerReset => "POWER-ON RESET",
            PowerEvent::SoftReset => "SOFTWARE RESET",
            PowerEvent::TimeSet => "TIME SET",
            PowerEvent::WatchdogReset => "WATCHDOG RESET",
            PowerEvent::NewBattery => "NEW BATTERY",
        }
    }
}

/// Header frame sent at the start of each log dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prologue {
    /// Dump this header opened
    pub phase: LogPhase,
    /// Date the log was started (bytes 4..=9)
    pub start: DeviceTime,
    /// Instrument serial number
    pub serial_number: u16,
    /// Firmware revision, three ASCII characters
    pub firmware: String,
}

/// A reset, clock or battery event with the battery state at that moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerRecord {
    /// What happened
    pub event: PowerEvent,
    /// When the event was logged
    pub time: DeviceTime,
    /// Battery voltage in centivolts
    pub voltage_cv: u16,
    /// Current drain in milliamps
    pub current_ma: i16,
}

impl PowerRecord {
    /// Battery voltage in volts
    pub fn voltage(&self) -> f64 {
        f64::from(self.voltage_cv) / 100.0
    }
}

/// Peak readings recorded while an alarm was active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlarmRecord {
    /// When the alarm ended
    pub time: DeviceTime,
    /// Peak gamma count rate in counts per second
    pub max_gamma_cps: i32,
    /// Peak dose rate in nSv/h
    pub max_dose_rate: i32,
}

/// Dose accumulated over one logging interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoseRecord {
    /// End of the interval
    pub time: DeviceTime,
    /// Accumulated dose in nSv
    pub dose_nsv: i32,
    /// Length of the interval in seconds
    pub elapsed_seconds: u16,
}

impl DoseRecord {
    /// Average dose rate over the interval in nSv/h.
    ///
    /// A zero-length interval yields a non-finite value (infinity, or NaN
    /// for a zero dose) instead of failing.
    pub fn dose_rate(&self) -> f64 {
        f64::from(self.dose_nsv) * 3600.0 / f64::from(self.elapsed_seconds)
    }
}

/// A frame whose tag is not recognised, kept verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnknownRecord {
    /// Tag byte at offset 15
    pub tag: u8,
    /// The whole frame
    pub raw: [u8; LOG_FRAME_LEN],
}

/// One decoded log frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Record {
    /// Log header
    Prologue(Prologue),
    /// Reset, clock or battery event
    Power(PowerRecord),
    /// Alarm peak readings
    Alarm(AlarmRecord),
    /// Dose for one interval
    Dose(DoseRecord),
    /// Unrecognised tag
    Unknown(UnknownRecord),
}

impl Record {
    /// Tag byte the record was decoded from
    pub fn tag(&self) -> u8 {
        match self {
            Record::Prologue(_) => PROLOGUE_TAG,
            Record::Power(p) => p.event.tag(),
            Record::Alarm(_) => ALARM_TAG,
            Record::Dose(_) => DOSE_TAG,
            Record::Unknown(u) => u.tag,
        }
    }

    /// Time the record refers to; for a prologue this is the log start date
    pub fn timestamp(&self) -> Option<DeviceTime> {
        match self {
            Record::Prologue(p) => Some(p.start),
            Record::Power(p) => Some(p.time),
            Record::Alarm(a) => Some(a.time),
            Record::Dose(d) => Some(d.time),
            Record::Unknown(_) => None,
        }
    }

    /// Short human-readable name of the record kind
    pub fn label(&self) -> &'static str {
        match self {
            Record::Prologue(_) => "PROLOGUE",
            Record::Power(p) => p.event.label(),
            Record::Alarm(_) => "ALARM",
            Record::Dose(_) => "DOSE",
            Record::Unknown(_) => "UNKNOWN",
        }
    }
}
