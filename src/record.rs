//! The time record model and defensive parsing of backend responses.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::timefmt;

/// A single time entry: whose time it is, and the interval it covers.
///
/// Immutable once constructed. The interval ordering (`start <= end`) is
/// enforced where records are submitted, not re-checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRecord {
    /// Owning identifier. Treated as an opaque string, not validated as an
    /// email address.
    pub email: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRecord {
    pub fn new(email: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            start,
            end,
        }
    }

    /// Parse one element of a backend response array.
    ///
    /// Returns `None` for JSON nulls and for elements with missing or
    /// unparseable fields. The backend is not assumed fully well-formed;
    /// a bad element is dropped rather than failing the whole page.
    pub fn from_backend_value(value: &Value) -> Option<Self> {
        let email = value["email"].as_str()?;
        let start = timefmt::parse_backend_timestamp(value["start"].as_str()?).ok()?;
        let end = timefmt::parse_backend_timestamp(value["end"].as_str()?).ok()?;
        Some(Self::new(email, start, end))
    }

    /// Parse a backend response array, silently dropping malformed elements.
    pub fn parse_page(elements: &[Value]) -> Vec<Self> {
        let records: Vec<Self> = elements.iter().filter_map(Self::from_backend_value).collect();
        let dropped = elements.len() - records.len();
        if dropped > 0 {
            debug!(dropped, "Dropped malformed elements from backend page");
        }
        records
    }
}
