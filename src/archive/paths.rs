//! Candidate path resolution from the archive's file-naming template.
//!
//! The template mixes two substitution layers: literal channel tokens
//! (`%n` network, `%s` station, `%l` location, `%c` channel) and strftime
//! date directives. Channel tokens are replaced first; the validated code
//! charset (`A-Z`, `0-9`, `-`) cannot contain `%`, so substituted values
//! never introduce new directives. The remaining pattern is then formatted
//! once per hour touched by the query window.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, Utc};

use crate::query::{ChannelId, TimeWindow};

/// Check that a template is usable at all: its strftime remainder must be
/// well-formed and it must distinguish hours, or every candidate path for a
/// window would collapse into one. Run once at configuration load.
pub fn validate_template(template: &str) -> Result<(), String> {
    if template.is_empty() {
        return Err("template is empty".to_string());
    }
    if !template.contains("%H") {
        return Err("template has no %H hour directive".to_string());
    }
    let stripped = substitute_tokens(template, "", "", "", "");
    if StrftimeItems::new(&stripped).any(|item| matches!(item, Item::Error)) {
        return Err(format!(
            "template contains an invalid strftime directive: {template}"
        ));
    }
    Ok(())
}

/// Expand a channel and time window into the ordered list of archive files
/// that could contain matching records: one path per calendar hour from
/// `start` (truncated to the hour) up to, but not including, `end`.
///
/// Purely computational; whether the files exist is the scanner's concern.
pub fn resolve(template: &str, channel: &ChannelId, window: &TimeWindow) -> Vec<PathBuf> {
    let pattern = substitute_tokens(
        template,
        &channel.net,
        &channel.sta,
        channel.path_location(),
        &channel.cha,
    );
    hour_range(window)
        .into_iter()
        .map(|hour| PathBuf::from(hour.format(&pattern).to_string()))
        .collect()
}

fn substitute_tokens(template: &str, net: &str, sta: &str, loc: &str, cha: &str) -> String {
    template
        .replace("%n", net)
        .replace("%s", sta)
        .replace("%l", loc)
        .replace("%c", cha)
}

/// The hour boundaries a window touches, in ascending order. Non-empty for
/// every valid window since `start < end`.
fn hour_range(window: &TimeWindow) -> Vec<DateTime<Utc>> {
    let mut hours = Vec::new();
    let mut hour = floor_to_hour(window.start);
    while hour < window.end {
        hours.push(hour);
        hour = match hour.checked_add_signed(Duration::hours(1)) {
            Some(next) => next,
            None => break,
        };
    }
    hours
}

fn floor_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(3600), 0).unwrap_or(t)
}
