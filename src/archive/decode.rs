//! Record header decoding.
//!
//! The scanner only needs the time interval a record covers, so the decoder
//! capability is a narrow trait: bytes in, `{start, end}` or a typed error
//! out. Swapping in a different header codec (or a full miniSEED library)
//! never touches the scanner.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Length of the miniSEED 2.x fixed section of data header.
pub const FIXED_HEADER_LEN: usize = 48;

/// Decoded time interval of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordTimes {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Header problems that make a single record unusable. The scanner logs
/// these and moves on; they never abort a query.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("record shorter than fixed header: {0} bytes")]
    Truncated(usize),

    #[error("sequence number is not ASCII digits: {0:?}")]
    BadSequence(String),

    #[error("unrecognized data quality indicator: {0:#04x}")]
    BadQuality(u8),

    #[error("invalid record start time: year {year} day {day} {hour:02}:{minute:02}:{second:02}")]
    BadTime {
        year: u16,
        day: u16,
        hour: u8,
        minute: u8,
        second: u8,
    },
}

/// Bytes in, record interval out.
pub trait RecordDecoder: Send + Sync {
    fn decode(&self, block: &[u8]) -> Result<RecordTimes, DecodeError>;
}

/// Decoder for big-endian miniSEED 2.x fixed headers, the format ringserver
/// writes into hourly archive files.
///
/// Only the fields needed to place the record in time are read: the BTIME
/// start, the sample count, and the sample rate factor/multiplier pair.
/// The end time is `start + (nsamp - 1) / rate`; records with no samples or
/// no rate (LOG and administrative channels) cover a single instant.
#[derive(Debug, Default)]
pub struct MiniSeed2Decoder;

impl RecordDecoder for MiniSeed2Decoder {
    fn decode(&self, block: &[u8]) -> Result<RecordTimes, DecodeError> {
        if block.len() < FIXED_HEADER_LEN {
            return Err(DecodeError::Truncated(block.len()));
        }

        let sequence = &block[0..6];
        if !sequence
            .iter()
            .all(|b| b.is_ascii_digit() || *b == b' ')
        {
            return Err(DecodeError::BadSequence(
                String::from_utf8_lossy(sequence).into_owned(),
            ));
        }

        let quality = block[6];
        if !matches!(quality, b'D' | b'R' | b'Q' | b'M') {
            return Err(DecodeError::BadQuality(quality));
        }

        let year = u16::from_be_bytes([block[20], block[21]]);
        let day = u16::from_be_bytes([block[22], block[23]]);
        let hour = block[24];
        let minute = block[25];
        let second = block[26];
        let fract = u16::from_be_bytes([block[28], block[29]]);

        let bad_time = || DecodeError::BadTime {
            year,
            day,
            hour,
            minute,
            second,
        };

        if !(1900..=2100).contains(&year) {
            return Err(bad_time());
        }
        let date = NaiveDate::from_yo_opt(i32::from(year), u32::from(day)).ok_or_else(bad_time)?;
        // BTIME fraction is in units of 0.0001 seconds.
        let time = NaiveTime::from_hms_micro_opt(
            u32::from(hour),
            u32::from(minute),
            u32::from(second),
            u32::from(fract) * 100,
        )
        .ok_or_else(bad_time)?;
        let mut start = NaiveDateTime::new(date, time).and_utc();

        // Apply the header time correction unless the writer already has
        // (activity flag bit 1), also in 0.0001 second units.
        let activity_flags = block[36];
        if activity_flags & 0x02 == 0 {
            let correction = i32::from_be_bytes([block[40], block[41], block[42], block[43]]);
            start = start + Duration::microseconds(i64::from(correction) * 100);
        }

        let nsamp = u16::from_be_bytes([block[30], block[31]]);
        let factor = i16::from_be_bytes([block[32], block[33]]);
        let multiplier = i16::from_be_bytes([block[34], block[35]]);

        let rate = sample_rate(factor, multiplier);
        let end = if nsamp > 1 && rate > 0.0 {
            let span_us = (f64::from(nsamp - 1) / rate * 1_000_000.0).round() as i64;
            start + Duration::microseconds(span_us)
        } else {
            start
        };

        Ok(RecordTimes { start, end })
    }
}

/// Sample rate in Hz from the SEED factor/multiplier encoding. Negative
/// values mean "1 over": factor -10 with multiplier 1 is 0.1 Hz.
fn sample_rate(factor: i16, multiplier: i16) -> f64 {
    if factor == 0 || multiplier == 0 {
        return 0.0;
    }
    let factor = f64::from(factor);
    let multiplier = f64::from(multiplier);
    let rate = if factor > 0.0 { factor } else { -1.0 / factor };
    if multiplier > 0.0 {
        rate * multiplier
    } else {
        rate * (-1.0 / multiplier)
    }
}
