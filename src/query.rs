//! Query parameter validation.
//!
//! Raw parameters arrive as optional strings (both FDSN long and short
//! spellings are accepted); [`RawQuery::validate`] turns them into a typed
//! [`DataQuery`] or the first [`FdsnError`] encountered, checked in a fixed
//! order so clients get stable error messages.

use axum::http::StatusCode;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::FdsnError;

/// The only response format this archive can produce.
pub const SUPPORTED_FORMAT: &str = "miniseed";

/// Maximum lengths of the four SEED code components.
const MAX_NET: usize = 2;
const MAX_STA: usize = 5;
const MAX_LOC: usize = 2;
const MAX_CHA: usize = 3;

/// Four-part SEED address of one recording channel.
///
/// Codes are uppercase alphanumerics plus hyphen, length-limited per
/// component. The location code is kept as given; `--` (the FDSN spelling
/// of "no location code") is normalized only at path-substitution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId {
    pub net: String,
    pub sta: String,
    pub loc: String,
    pub cha: String,
}

impl ChannelId {
    pub fn new(net: &str, sta: &str, loc: &str, cha: &str) -> Result<Self, FdsnError> {
        check_code("net", net, MAX_NET)?;
        check_code("sta", sta, MAX_STA)?;
        check_code("loc", loc, MAX_LOC)?;
        check_code("cha", cha, MAX_CHA)?;
        Ok(Self {
            net: net.to_string(),
            sta: sta.to_string(),
            loc: loc.to_string(),
            cha: cha.to_string(),
        })
    }

    /// Location code as substituted into archive paths: `--` means none.
    pub fn path_location(&self) -> &str {
        if self.loc == "--" {
            ""
        } else {
            &self.loc
        }
    }
}

fn check_code(name: &str, value: &str, max_len: usize) -> Result<(), FdsnError> {
    let charset_ok = value
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
    if value.len() > max_len || !charset_ok {
        return Err(FdsnError::invalid_parameter(format!(
            "{name} code {value:?} is not valid: at most {max_len} characters from A-Z, 0-9 and -"
        )));
    }
    Ok(())
}

/// UTC query interval, `end` exclusive. Construction enforces `end > start`
/// and the configured maximum span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_timerange: Duration,
    ) -> Result<Self, FdsnError> {
        let max_hours = max_timerange.num_hours();
        if end <= start {
            return Err(FdsnError {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: format!("end time {end} must be after start time {start}"),
            });
        }
        if end - start > max_timerange {
            return Err(FdsnError::request_too_large(max_hours));
        }
        Ok(Self { start, end })
    }
}

/// Status returned when a query matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodataPolicy {
    /// `nodata=204`, the default.
    #[default]
    NoContent,
    /// `nodata=404`.
    NotFound,
}

impl NodataPolicy {
    pub fn status(self) -> StatusCode {
        match self {
            NodataPolicy::NoContent => StatusCode::NO_CONTENT,
            NodataPolicy::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Raw query string as deserialized by the extractor. Every field is
/// optional here; presence rules are applied by [`RawQuery::validate`].
#[derive(Debug, Default, Deserialize)]
pub struct RawQuery {
    #[serde(alias = "network")]
    pub net: Option<String>,
    #[serde(alias = "station")]
    pub sta: Option<String>,
    #[serde(alias = "location")]
    pub loc: Option<String>,
    #[serde(alias = "channel")]
    pub cha: Option<String>,
    #[serde(alias = "starttime")]
    pub start: Option<String>,
    #[serde(alias = "endtime")]
    pub end: Option<String>,
    pub format: Option<String>,
    pub nodata: Option<String>,
}

/// A fully validated dataselect query.
#[derive(Debug, Clone)]
pub struct DataQuery {
    pub channel: ChannelId,
    pub window: TimeWindow,
    pub nodata: NodataPolicy,
}

impl RawQuery {
    /// Validate in protocol order; the first failing rule wins.
    pub fn validate(self, max_timerange: Duration) -> Result<DataQuery, FdsnError> {
        let (Some(start), Some(end)) = (self.start.as_deref(), self.end.as_deref()) else {
            return Err(FdsnError::invalid_parameter(format!(
                "start and end times are required. start: {:?}, end: {:?}",
                self.start, self.end
            )));
        };

        let (Some(net), Some(sta), Some(loc), Some(cha)) = (
            self.net.as_deref(),
            self.sta.as_deref(),
            self.loc.as_deref(),
            self.cha.as_deref(),
        ) else {
            return Err(FdsnError::invalid_parameter(format!(
                "net, sta, loc and cha are required. net: {:?}, sta: {:?}, loc: {:?}, cha: {:?}",
                self.net, self.sta, self.loc, self.cha
            )));
        };

        let format = self.format.as_deref().unwrap_or(SUPPORTED_FORMAT);
        if format != SUPPORTED_FORMAT {
            return Err(FdsnError::invalid_parameter(format!(
                "only miniseed format is accepted: {format}"
            )));
        }

        let nodata = match self.nodata.as_deref() {
            None | Some("204") => NodataPolicy::NoContent,
            Some("404") => NodataPolicy::NotFound,
            Some(other) => {
                return Err(FdsnError::invalid_parameter(format!(
                    "nodata must be 204 or 404: {other}"
                )));
            }
        };

        let channel = ChannelId::new(net, sta, loc, cha)?;

        let start = parse_utc("start", start)?;
        let end = parse_utc("end", end)?;
        let window = TimeWindow::new(start, end, max_timerange)?;

        Ok(DataQuery {
            channel,
            window,
            nodata,
        })
    }
}

/// Parse an ISO-8601 timestamp. A timestamp without an explicit offset is
/// taken as UTC; one with an offset is converted to UTC. A bare date means
/// midnight of that day.
fn parse_utc(name: &str, value: &str) -> Result<DateTime<Utc>, FdsnError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(FdsnError::invalid_parameter(format!(
        "could not parse {name} time as ISO-8601: {value}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(pairs: &[(&str, &str)]) -> RawQuery {
        let mut query = RawQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "net" => query.net = value,
                "sta" => query.sta = value,
                "loc" => query.loc = value,
                "cha" => query.cha = value,
                "start" => query.start = value,
                "end" => query.end = value,
                "format" => query.format = value,
                "nodata" => query.nodata = value,
                other => panic!("unknown key {other}"),
            }
        }
        query
    }

    fn complete() -> RawQuery {
        raw(&[
            ("net", "CI"),
            ("sta", "PASC"),
            ("loc", "00"),
            ("cha", "BHZ"),
            ("start", "2024-03-01T00:00:00"),
            ("end", "2024-03-01T02:00:00"),
        ])
    }

    fn day() -> Duration {
        Duration::hours(24)
    }

    #[test]
    fn test_valid_query() {
        let query = complete().validate(day()).unwrap();
        assert_eq!(query.channel.net, "CI");
        assert_eq!(query.channel.sta, "PASC");
        assert_eq!(query.nodata, NodataPolicy::NoContent);
        assert_eq!(
            query.window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_times_rejected_first() {
        // Times are checked before channel codes.
        let mut query = raw(&[("sta", "PASC")]);
        query.start = None;
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("start and end times"));
    }

    #[test]
    fn test_missing_channel_codes() {
        let query = raw(&[
            ("start", "2024-03-01T00:00:00"),
            ("end", "2024-03-01T01:00:00"),
            ("net", "CI"),
        ]);
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("net, sta, loc and cha"));
    }

    #[test]
    fn test_long_aliases_accepted() {
        let query: RawQuery = serde_json::from_str(
            r#"{
                "network": "CI",
                "station": "PASC",
                "location": "00",
                "channel": "BHZ",
                "starttime": "2024-03-01T00:00:00",
                "endtime": "2024-03-01T01:00:00"
            }"#,
        )
        .unwrap();
        let validated = query.validate(day()).unwrap();
        assert_eq!(validated.channel.cha, "BHZ");
        assert_eq!(validated.channel.net, "CI");
    }

    #[test]
    fn test_unsupported_format() {
        let mut query = complete();
        query.format = Some("sac".to_string());
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("miniseed"));
    }

    #[test]
    fn test_format_is_case_sensitive() {
        let mut query = complete();
        query.format = Some("MiniSEED".to_string());
        assert!(query.validate(day()).is_err());
    }

    #[test]
    fn test_nodata_values() {
        let mut query = complete();
        query.nodata = Some("404".to_string());
        assert_eq!(
            query.validate(day()).unwrap().nodata,
            NodataPolicy::NotFound
        );

        let mut query = complete();
        query.nodata = Some("200".to_string());
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_network_too_long() {
        let mut query = complete();
        query.net = Some("USC".to_string());
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("net"));
    }

    #[test]
    fn test_lowercase_rejected() {
        let mut query = complete();
        query.cha = Some("bhz".to_string());
        assert!(query.validate(day()).is_err());
    }

    #[test]
    fn test_empty_location_allowed() {
        let mut query = complete();
        query.loc = Some(String::new());
        assert!(query.validate(day()).is_ok());
    }

    #[test]
    fn test_no_location_code_normalization() {
        let channel = ChannelId::new("CI", "PASC", "--", "BHZ").unwrap();
        assert_eq!(channel.loc, "--");
        assert_eq!(channel.path_location(), "");

        let channel = ChannelId::new("CI", "PASC", "00", "BHZ").unwrap();
        assert_eq!(channel.path_location(), "00");
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let query = complete().validate(day()).unwrap();
        assert_eq!(query.window.start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_offset_timestamp_converted() {
        let mut query = complete();
        query.start = Some("2024-03-01T02:00:00+02:00".to_string());
        let validated = query.validate(day()).unwrap();
        assert_eq!(
            validated.window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_zulu_and_fractional_seconds() {
        let mut query = complete();
        query.start = Some("2024-03-01T00:00:00.500Z".to_string());
        let validated = query.validate(day()).unwrap();
        assert_eq!(validated.window.start.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_bare_date_is_midnight() {
        let mut query = complete();
        query.start = Some("2024-03-01".to_string());
        query.end = Some("2024-03-01T12:00:00".to_string());
        let validated = query.validate(day()).unwrap();
        assert_eq!(
            validated.window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_garbage_timestamp() {
        let mut query = complete();
        query.end = Some("next tuesday".to_string());
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("ISO-8601"));
    }

    #[test]
    fn test_window_too_large() {
        let mut query = complete();
        query.end = Some("2024-03-02T01:00:00".to_string());
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_window_exactly_at_limit() {
        let mut query = complete();
        query.end = Some("2024-03-02T00:00:00".to_string());
        assert!(query.validate(day()).is_ok());
    }

    #[test]
    fn test_reversed_window() {
        let mut query = complete();
        query.end = Some("2024-02-29T00:00:00".to_string());
        let err = query.validate(day()).unwrap_err();
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
