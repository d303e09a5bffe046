//! Device Log Records
//!
//! Decodes the 16-byte frames of the diagnostic and dose logs and keeps
//! them in one ordered [`DeviceLog`]. The diagnostic, alarm and dose
//! reports are filters over that single log.

mod decode;
mod types;

pub use decode::{decode, is_stop_sentinel, TAG_OFFSET};
pub(crate) use decode::ascii_field;
pub use types::{
    AlarmRecord, DoseRecord, PowerEvent, PowerRecord, Prologue, Record, UnknownRecord,
    ALARM_TAG, DOSE_TAG, PROLOGUE_TAG,
};

use serde::Serialize;

use crate::protocol::Command;

/// One of the two log dumps that together make up the device log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogPhase {
    /// Event log: resets, battery changes, alarms
    Diagnostic,
    /// Accumulated dose log
    Dose,
}

impl LogPhase {
    /// Both phases in the order they are fetched
    pub const ALL: [LogPhase; 2] = [LogPhase::Diagnostic, LogPhase::Dose];

    /// Command that starts this dump
    pub fn command(&self) -> Command {
        match self {
            LogPhase::Diagnostic => Command::DiagnosticLog,
            LogPhase::Dose => Command::DoseLog,
        }
    }
}

/// A filtered view over the device log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogView {
    /// Power, reset and clock events plus unrecognised frames
    Diagnostic,
    /// Prologues and alarm records
    Alarms,
    /// Dose records and the prologue of the dose dump
    Dose,
}

impl LogView {
    /// Check whether a record belongs in this view
    pub fn includes(&self, record: &Record) -> bool {
        match self {
            LogView::Diagnostic => matches!(record, Record::Power(_) | Record::Unknown(_)),
            LogView::Alarms => matches!(record, Record::Prologue(_) | Record::Alarm(_)),
            LogView::Dose => match record {
                Record::Prologue(p) => p.phase == LogPhase::Dose,
                Record::Dose(_) => true,
                _ => false,
            },
        }
    }
}

/// Every record read from the device in one session, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceLog {
    records: Vec<Record>,
    /// Phases that aborted before their stop sentinel
    incomplete: Vec<LogPhase>,
}

impl DeviceLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from already decoded records
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            incomplete: Vec::new(),
        }
    }

    pub(crate) fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub(crate) fn mark_incomplete(&mut self, phase: LogPhase) {
        if !self.incomplete.contains(&phase) {
            self.incomplete.push(phase);
        }
    }

    /// All records in arrival order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the log holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Phases that did not reach their stop sentinel
    pub fn incomplete_phases(&self) -> &[LogPhase] {
        &self.incomplete
    }

    /// Check whether both phases were read to the end
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }

    /// Records belonging to a view, in arrival order
    pub fn view(&self, view: LogView) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().filter(move |r| view.includes(r))
    }

    /// Power, reset and clock events
    pub fn diagnostic(&self) -> impl Iterator<Item = &Record> + '_ {
        self.view(LogView::Diagnostic)
    }

    /// Prologues and alarms
    pub fn alarms(&self) -> impl Iterator<Item = &Record> + '_ {
        self.view(LogView::Alarms)
    }

    /// Dose records and the dose dump's prologue
    pub fn dose(&self) -> impl Iterator<Item = &Record> + '_ {
        self.view(LogView::Dose)
    }

    /// Log headers, one per phase read
    pub fn prologues(&self) -> impl Iterator<Item = &Prologue> + '_ {
        self.records.iter().filter_map(|r| match r {
            Record::Prologue(p) => Some(p),
            _ => None,
        })
    }
}
