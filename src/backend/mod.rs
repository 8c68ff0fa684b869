//! Backend client: the stateless leaf that talks to the record service.

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::TimeRecord;

/// The seam between the cache service and the record backend.
///
/// [`HttpBackend`] is the production implementation; tests substitute fakes.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Fetch up to `length` records of `owner` starting at `offset`.
    ///
    /// An empty result means the backend had nothing there; "owner unknown"
    /// and "no records" are indistinguishable. Transport failures are
    /// [`crate::error::TimecardError::BackendUnavailable`], never an empty
    /// page.
    async fn fetch_page(&self, owner: &str, offset: u32, length: u32) -> Result<Vec<TimeRecord>>;

    /// Submit a new record. Any failure is
    /// [`crate::error::TimecardError::Backend`], returned, not raised.
    async fn submit_record(&self, record: &TimeRecord) -> Result<()>;
}
