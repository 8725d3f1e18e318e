//! The archive query engine.
//!
//! A query is resolved in two stages: the path resolver expands the
//! channel and time window into the hourly candidate files the archive
//! layout could have written, then the scanner reads those files and keeps
//! the records that overlap the window. The record decoder is injected so
//! the storage format can evolve without touching either stage.

pub mod decode;
pub mod paths;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testutil;

use crate::config::ServiceConfig;
use crate::query::{ChannelId, TimeWindow};
use decode::RecordDecoder;

/// Read-only handle on the miniSEED archive. Built once at startup from the
/// validated configuration; shared across requests behind an `Arc`.
pub struct Archive {
    template: String,
    record_size: usize,
    decoder: Box<dyn RecordDecoder>,
}

impl Archive {
    pub fn new(config: &ServiceConfig, decoder: Box<dyn RecordDecoder>) -> Self {
        Self {
            template: config.mseed.mseed_write.clone(),
            record_size: config.mseed.record_size,
            decoder,
        }
    }

    /// Raw bytes of every archived record for `channel` overlapping
    /// `window`, in archive order. Empty is a normal outcome.
    pub fn query(&self, channel: &ChannelId, window: &TimeWindow) -> Vec<u8> {
        let candidates = paths::resolve(&self.template, channel, window);
        tracing::debug!(
            net = %channel.net,
            sta = %channel.sta,
            candidates = candidates.len(),
            "Resolved candidate archive files"
        );
        scanner::scan(&candidates, window, self.record_size, self.decoder.as_ref())
    }
}
