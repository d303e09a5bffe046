//! Record decoder
//!
//! All multi-byte fields are little-endian. Fields are read at their full
//! width, so signedness applies to the assembled value only.

use byteorder::{ByteOrder, LittleEndian};

use super::LogPhase;
use super::types::{
    AlarmRecord, DoseRecord, PowerEvent, PowerRecord, Prologue, Record, UnknownRecord,
    ALARM_TAG, DOSE_TAG, PROLOGUE_TAG,
};
use crate::protocol::{LOG_FRAME_LEN, STOP_SENTINEL};
use crate::time::DeviceTime;

/// Offset of the tag byte in a log frame
pub const TAG_OFFSET: usize = 15;

/// Check whether a frame is the end-of-log marker
pub fn is_stop_sentinel(frame: &[u8; LOG_FRAME_LEN]) -> bool {
    *frame == STOP_SENTINEL
}

/// Decode a log frame read during `phase`. Total over every tag value.
pub fn decode(frame: &[u8; LOG_FRAME_LEN], phase: LogPhase) -> Record {
    let tag = frame[TAG_OFFSET];

    if let Some(event) = PowerEvent::from_tag(tag) {
        return Record::Power(PowerRecord {
            event,
            time: record_time(frame),
            voltage_cv: LittleEndian::read_u16(&frame[6..8]),
            current_ma: LittleEndian::read_i16(&frame[8..10]),
        });
    }

    match tag {
        PROLOGUE_TAG => Record::Prologue(Prologue {
            phase,
            start: time_at(frame, 4),
            serial_number: LittleEndian::read_u16(&frame[10..12]),
            firmware: ascii_field(&frame[12..15]),
        }),
        ALARM_TAG => Record::Alarm(AlarmRecord {
            time: record_time(frame),
            max_gamma_cps: LittleEndian::read_i32(&frame[6..10]),
            max_dose_rate: LittleEndian::read_i32(&frame[10..14]),
        }),
        DOSE_TAG => Record::Dose(DoseRecord {
            time: record_time(frame),
            dose_nsv: LittleEndian::read_i32(&frame[6..10]),
            elapsed_seconds: LittleEndian::read_u16(&frame[10..12]),
        }),
        _ => Record::Unknown(UnknownRecord { tag, raw: *frame }),
    }
}

fn record_time(frame: &[u8; LOG_FRAME_LEN]) -> DeviceTime {
    time_at(frame, 0)
}

fn time_at(frame: &[u8; LOG_FRAME_LEN], offset: usize) -> DeviceTime {
    let mut raw = [0u8; 6];
    raw.copy_from_slice(&frame[offset..offset + 6]);
    DeviceTime::from_raw(raw)
}

/// Decode a fixed-width ASCII field, dropping padding NULs and spaces
pub(crate) fn ascii_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\0', ' '])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(tag: u8, body: &[(usize, u8)]) -> [u8; LOG_FRAME_LEN] {
        let mut f = [0u8; LOG_FRAME_LEN];
        f[..6].copy_from_slice(&[13, 6, 2, 14, 30, 5]);
        for &(i, b) in body {
            f[i] = b;
        }
        f[TAG_OFFSET] = tag;
        f
    }

    fn decode(frame: &[u8; LOG_FRAME_LEN]) -> Record {
        super::decode(frame, LogPhase::Diagnostic)
    }

    #[test]
    fn test_alarm_fields_are_signed_32bit() {
        let mut f = frame(b'A', &[]);
        f[6..10].copy_from_slice(&(-1234i32).to_le_bytes());
        f[10..14].copy_from_slice(&0x7FFF_FF00i32.to_le_bytes());

        match decode(&f) {
            Record::Alarm(a) => {
                assert_eq!(a.max_gamma_cps, -1234);
                assert_eq!(a.max_dose_rate, 0x7FFF_FF00);
                assert_eq!(a.time.to_string(), "2013/06/02 14:30:05");
            }
            other => panic!("expected alarm, got {other:?}"),
        }
    }

    #[test]
    fn test_high_bytes_do_not_sign_extend() {
        // 0x80 in a low byte must not bleed into the high bytes
        let mut f = frame(b'A', &[]);
        f[6..10].copy_from_slice(&[0x80, 0x00, 0x00, 0x00]);
        match decode(&f) {
            Record::Alarm(a) => assert_eq!(a.max_gamma_cps, 128),
            other => panic!("expected alarm, got {other:?}"),
        }
    }

    #[test]
    fn test_power_events_share_layout() {
        for tag in [b'P', b'S', b'T', b'W', b'B'] {
            let f = frame(tag, &[(6, 0x6A), (7, 0x01), (8, 0xF6), (9, 0xFF)]);
            match decode(&f) {
                Record::Power(p) => {
                    assert_eq!(p.event.tag(), tag);
                    assert_eq!(p.voltage_cv, 362);
                    assert!((p.voltage() - 3.62).abs() < 1e-9);
                    assert_eq!(p.current_ma, -10);
                }
                other => panic!("expected power record, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_voltage_bytes_only_change_voltage() {
        let base = frame(b'P', &[(6, 0x10), (7, 0x01), (8, 0x05), (9, 0x00)]);
        let mut changed = base;
        changed[6] = 0xFF;
        changed[7] = 0xFF;

        let (Record::Power(a), Record::Power(b)) = (decode(&base), decode(&changed)) else {
            panic!("expected power records");
        };
        assert_eq!(a.current_ma, b.current_ma);
        assert_eq!(b.voltage_cv, 0xFFFF);
        assert!((b.voltage() - 655.35).abs() < 1e-9);
    }

    #[test]
    fn test_prologue() {
        let mut f = [0u8; LOG_FRAME_LEN];
        f[4..10].copy_from_slice(&[12, 11, 30, 8, 0, 0]);
        f[10..12].copy_from_slice(&4711u16.to_le_bytes());
        f[12..15].copy_from_slice(b"1.7");
        f[TAG_OFFSET] = PROLOGUE_TAG;

        assert_eq!(
            super::decode(&f, LogPhase::Dose),
            Record::Prologue(Prologue {
                phase: LogPhase::Dose,
                start: DeviceTime {
                    year: 2012,
                    month: 11,
                    day: 30,
                    hour: 8,
                    minute: 0,
                    second: 0,
                },
                serial_number: 4711,
                firmware: "1.7".to_string(),
            })
        );
    }

    #[test]
    fn test_dose_rate() {
        let mut f = frame(b'D', &[]);
        f[6..10].copy_from_slice(&3600i32.to_le_bytes());
        f[10..12].copy_from_slice(&3600u16.to_le_bytes());
        let Record::Dose(d) = decode(&f) else {
            panic!("expected dose record");
        };
        assert_eq!(d.dose_rate(), 3600.0);

        let zero = DoseRecord {
            elapsed_seconds: 0,
            ..d
        };
        assert!(!zero.dose_rate().is_finite());
    }

    #[test]
    fn test_dose_elapsed_is_unsigned() {
        let f = frame(b'D', &[(6, 1), (10, 0x00), (11, 0x80)]);
        let Record::Dose(d) = decode(&f) else {
            panic!("expected dose record");
        };
        assert_eq!(d.elapsed_seconds, 0x8000);
    }

    #[test]
    fn test_every_tag_decodes() {
        for tag in 0..=u8::MAX {
            let f = frame(tag, &[]);
            let record = decode(&f);
            assert_eq!(record.tag(), tag);
        }
    }

    #[test]
    fn test_unknown_keeps_raw_bytes() {
        let f = frame(b'Z', &[(7, 0x42)]);
        match decode(&f) {
            Record::Unknown(u) => {
                assert_eq!(u.tag, b'Z');
                assert_eq!(u.raw, f);
            }
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_stop_sentinel() {
        assert!(is_stop_sentinel(&[0xAA; LOG_FRAME_LEN]));
        let mut almost = [0xAA; LOG_FRAME_LEN];
        almost[3] = 0xAB;
        assert!(!is_stop_sentinel(&almost));
    }
}
