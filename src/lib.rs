//! FDSN dataselect web service over a miniSEED ring archive.
//!
//! Serves byte-exact waveform records from an hour-partitioned archive of
//! fixed-size miniSEED records, the file layout written by ringserver's
//! `MSeedWrite` setting.
//!
//! ## Architecture
//!
//! A request flows through four stages:
//!
//! 1. **Validation** (`query` module) - raw query parameters become a typed
//!    query or a protocol error with the right status code.
//!
//! 2. **Path resolution** (`archive::paths`) - the channel and time window
//!    expand into one candidate file per calendar hour via the configured
//!    naming template.
//!
//! 3. **Scanning** (`archive::scanner`) - candidate files are read as
//!    fixed-size records and filtered by time overlap, tolerating archive
//!    gaps and single-record corruption.
//!
//! 4. **Response** (`server` module) - matching bytes are returned as a
//!    miniSEED attachment; failures render a uniform HTML error envelope.

pub mod archive;
pub mod config;
pub mod error;
pub mod query;
pub mod server;
