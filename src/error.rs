//! Crate-wide error type.
//!
//! Backend-facing failures are regular values, never panics: the read path
//! surfaces [`TimecardError::BackendUnavailable`], the write path
//! [`TimecardError::Backend`]. The caller decides whether to retry; no
//! retry or backoff happens on its behalf.

use thiserror::Error;

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum TimecardError {
    /// The backend could not be reached or returned an unusable response
    /// during a read. Never cached as a result.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend rejected a record submission.
    #[error("backend rejected record: {0}")]
    Backend(String),

    /// The configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A caller-supplied value (query or form field) could not be parsed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TimecardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_cause() {
        let err = TimecardError::BackendUnavailable("connection refused".into());
        assert_eq!(err.to_string(), "backend unavailable: connection refused");

        let err = TimecardError::Backend("500 Internal Server Error".into());
        assert!(err.to_string().contains("500"));
    }
}
