//! Fixed-size record scanning with per-file and per-record fault tolerance.
//!
//! The archive is produced by an independent writer and has expected gaps
//! (a station offline for an hour leaves no file), so a missing candidate
//! file is not an error. Corruption is contained to the smallest possible
//! unit: a record that fails to decode is logged and skipped, a file that
//! fails mid-read is abandoned, and in both cases the scan of everything
//! else continues.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::PathBuf;

use super::decode::{RecordDecoder, RecordTimes};
use crate::query::TimeWindow;

/// Scan candidate files in order and return the concatenated raw bytes of
/// every record whose interval overlaps the window.
///
/// Bytes are appended in file-list order, then on-disk order within each
/// file; archive files are written time-ordered, so no re-sort happens.
pub fn scan(
    paths: &[PathBuf],
    window: &TimeWindow,
    record_size: usize,
    decoder: &dyn RecordDecoder,
) -> Vec<u8> {
    let mut out = Vec::new();
    for path in paths {
        // Handle is scoped to this iteration and closed on every exit path.
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(file = %path.display(), "No archive file for hour, skipping");
                continue;
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "Failed to open archive file, skipping");
                continue;
            }
        };

        let mut block = vec![0u8; record_size];
        let mut offset = 0u64;
        loop {
            match file.read_exact(&mut block) {
                Ok(()) => {}
                // A short trailing block is padding left by the writer.
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
                Err(err) => {
                    tracing::warn!(
                        file = %path.display(),
                        offset,
                        error = %err,
                        "Read failed mid-file, abandoning rest of file"
                    );
                    break;
                }
            }

            match decoder.decode(&block) {
                Ok(times) => {
                    if overlaps(&times, window) {
                        out.extend_from_slice(&block);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        file = %path.display(),
                        offset,
                        error = %err,
                        "Undecodable record, skipping"
                    );
                }
            }
            offset += record_size as u64;
        }
    }
    out
}

/// Boundary-inclusive interval intersection: a record touching the window's
/// edge still belongs to the result.
fn overlaps(record: &RecordTimes, window: &TimeWindow) -> bool {
    !(record.start > window.end || record.end < window.start)
}
