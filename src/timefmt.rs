//! Timestamp layouts for the backend wire formats and browser-facing
//! rendering.
//!
//! Three fixed layouts are in play:
//! - backend JSON responses carry `2024-05-01T08:30:00.000+0000`
//! - record submissions are form-encoded as UTC `01.05.2024 08:30`
//! - the browser sends and receives wall-clock times offset from UTC by a
//!   caller-supplied number of minutes (no tz database lookup; the offset
//!   comes from the client)

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

use crate::error::{Result, TimecardError};

/// Layout of timestamps in backend `GET /records` responses.
pub const BACKEND_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Layout of timestamps in `POST /records` form fields. Always rendered in
/// UTC.
pub const SUBMIT_TIMESTAMP: &str = "%d.%m.%Y %H:%M";

/// Layout used when rendering a timestamp for display.
pub const DISPLAY_TIMESTAMP: &str = "%Y-%m-%d - %H:%M";

/// HTML `datetime-local` input layout, with and without seconds.
const INPUT_WITH_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
const INPUT_WITHOUT_SECONDS: &str = "%Y-%m-%dT%H:%M";

/// Parse a timestamp from a backend response.
pub fn parse_backend_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(value, BACKEND_TIMESTAMP)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimecardError::InvalidInput(format!("bad timestamp '{value}': {e}")))
}

/// Render a timestamp for a record submission form field (UTC).
pub fn format_submit_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(SUBMIT_TIMESTAMP).to_string()
}

/// Parse a browser `datetime-local` value as wall-clock time at the given
/// UTC offset (minutes east of UTC) and convert it to UTC.
///
/// Accepts `2024-05-01T08:30` and `2024-05-01T08:30:15`.
pub fn parse_local_input(value: &str, tz_offset_minutes: i32) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, INPUT_WITH_SECONDS)
        .or_else(|_| NaiveDateTime::parse_from_str(value, INPUT_WITHOUT_SECONDS))
        .map_err(|e| TimecardError::InvalidInput(format!("bad datetime '{value}': {e}")))?;

    let offset = offset_from_minutes(tz_offset_minutes)?;
    match offset.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Fixed offsets have no DST gaps; this arm is unreachable in practice.
        _ => Err(TimecardError::InvalidInput(format!(
            "ambiguous datetime '{value}'"
        ))),
    }
}

/// Render a timestamp for display at the given UTC offset (minutes east of
/// UTC).
pub fn format_display(ts: DateTime<Utc>, tz_offset_minutes: i32) -> String {
    let offset =
        offset_from_minutes(tz_offset_minutes).unwrap_or_else(|_| Utc.fix());
    ts.with_timezone(&offset).format(DISPLAY_TIMESTAMP).to_string()
}

fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            TimecardError::InvalidInput(format!("bad utc offset: {minutes} minutes"))
        })
}
