//! Synthetic miniSEED records for scanner and decoder tests.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

/// Knobs for building one synthetic record.
pub struct RecordSpec {
    pub start: DateTime<Utc>,
    pub nsamp: u16,
    pub factor: i16,
    pub multiplier: i16,
    /// Header time correction in 0.0001 second units.
    pub time_correction: i32,
    /// Whether the activity flags claim the correction is already applied.
    pub correction_applied: bool,
    pub record_size: usize,
    /// Byte used to fill the data section, so payloads are distinguishable.
    pub fill: u8,
}

impl Default for RecordSpec {
    fn default() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            nsamp: 100,
            factor: 100,
            multiplier: 1,
            time_correction: 0,
            correction_applied: false,
            record_size: 512,
            fill: 0x55,
        }
    }
}

/// Build a record with a valid big-endian fixed header and a filled data
/// section.
pub fn test_record(spec: &RecordSpec) -> Vec<u8> {
    let mut block = vec![spec.fill; spec.record_size];

    block[0..6].copy_from_slice(b"000001");
    block[6] = b'D';
    block[7] = b' ';
    block[8..13].copy_from_slice(b"PASC ");
    block[13..15].copy_from_slice(b"00");
    block[15..18].copy_from_slice(b"BHZ");
    block[18..20].copy_from_slice(b"CI");

    let start = spec.start;
    block[20..22].copy_from_slice(&(start.year() as u16).to_be_bytes());
    block[22..24].copy_from_slice(&(start.ordinal() as u16).to_be_bytes());
    block[24] = start.hour() as u8;
    block[25] = start.minute() as u8;
    block[26] = start.second() as u8;
    block[27] = 0;
    let fract = (start.timestamp_subsec_micros() / 100) as u16;
    block[28..30].copy_from_slice(&fract.to_be_bytes());

    block[30..32].copy_from_slice(&spec.nsamp.to_be_bytes());
    block[32..34].copy_from_slice(&spec.factor.to_be_bytes());
    block[34..36].copy_from_slice(&spec.multiplier.to_be_bytes());

    block[36] = if spec.correction_applied { 0x02 } else { 0x00 };
    block[40..44].copy_from_slice(&spec.time_correction.to_be_bytes());

    block
}

/// A record whose samples span `[start, start + span_secs]` at 1 Hz.
pub fn record_covering(start: DateTime<Utc>, span_secs: u16) -> Vec<u8> {
    test_record(&RecordSpec {
        start,
        nsamp: span_secs + 1,
        factor: 1,
        multiplier: 1,
        ..RecordSpec::default()
    })
}
