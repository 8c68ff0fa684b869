//! Reqwest-backed implementation of [`RecordBackend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{Result, TimecardError};
use crate::record::TimeRecord;
use crate::timefmt;

use super::RecordBackend;

/// HTTP client for the record backend. No internal state beyond the
/// connection pool.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn records_url(&self) -> String {
        format!("{}/records", self.base_url)
    }

    /// Form fields for a record submission. Timestamps are rendered in UTC.
    fn submit_form(record: &TimeRecord) -> [(&'static str, String); 3] {
        [
            ("email", record.email.clone()),
            ("start", timefmt::format_submit_timestamp(record.start)),
            ("end", timefmt::format_submit_timestamp(record.end)),
        ]
    }
}

#[async_trait]
impl RecordBackend for HttpBackend {
    async fn fetch_page(&self, owner: &str, offset: u32, length: u32) -> Result<Vec<TimeRecord>> {
        debug!(owner, offset, length, "Fetching records page from backend");

        let response = self
            .client
            .get(self.records_url())
            .query(&[
                ("email", owner.to_string()),
                ("offset", offset.to_string()),
                ("length", length.to_string()),
            ])
            .send()
            .await
            .map_err(|e| TimecardError::BackendUnavailable(format!("records fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TimecardError::BackendUnavailable(format!(
                "records fetch returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            TimecardError::BackendUnavailable(format!("unparseable records response: {e}"))
        })?;
        let elements = body.as_array().ok_or_else(|| {
            TimecardError::BackendUnavailable("records response is not an array".to_string())
        })?;

        Ok(TimeRecord::parse_page(elements))
    }

    async fn submit_record(&self, record: &TimeRecord) -> Result<()> {
        debug!(owner = %record.email, "Submitting record to backend");

        let response = self
            .client
            .post(self.records_url())
            .form(&Self::submit_form(record))
            .send()
            .await
            .map_err(|e| TimecardError::Backend(format!("record submit failed: {e}")))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            Err(TimecardError::Backend(format!("record submit returned {status}")))
        } else {
            Err(TimecardError::Backend(format!(
                "record submit returned {status}: {body}"
            )))
        }
    }
}
