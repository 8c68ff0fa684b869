//! Record listing and creation routes.
//!
//! Pagination state belongs to the caller: every request carries its own
//! `offset`, and the response's `has_more` flag (page length reached) tells
//! the caller whether asking for the next page is worthwhile.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::server::AppState;
use crate::error::TimecardError;
use crate::record::TimeRecord;
use crate::timefmt;

/// Query parameters for `GET /api/records`.
#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub email: String,
    /// Index of the first record to return.
    #[serde(default)]
    pub offset: u32,
    /// Page length; the configured default applies when absent.
    pub length: Option<u32>,
    /// Minutes east of UTC for display formatting.
    #[serde(default)]
    pub tz_offset: i32,
}

/// One record rendered for display.
#[derive(Debug, Serialize)]
struct RecordView {
    email: String,
    start: String,
    end: String,
}

/// GET /api/records: a page of an owner's records.
pub async fn get_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
) -> (StatusCode, Json<Value>) {
    if query.email.trim().is_empty() {
        return error_response(&TimecardError::InvalidInput(
            "email must not be empty".to_string(),
        ));
    }
    let length = query.length.unwrap_or(state.page_length);
    if length == 0 {
        return error_response(&TimecardError::InvalidInput(
            "length must be positive".to_string(),
        ));
    }

    match state.records.get_records(&query.email, query.offset, length).await {
        Ok(records) => {
            let has_more = records.len() as u32 == length;
            let views: Vec<RecordView> = records
                .iter()
                .map(|r| RecordView {
                    email: r.email.clone(),
                    start: timefmt::format_display(r.start, query.tz_offset),
                    end: timefmt::format_display(r.end, query.tz_offset),
                })
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "records": views, "has_more": has_more })),
            )
        }
        Err(err) => error_response(&err),
    }
}

/// Form fields for `POST /api/records`.
#[derive(Debug, Deserialize)]
pub struct CreateRecordForm {
    pub email: String,
    /// Wall-clock `datetime-local` values, interpreted at `tz_offset`.
    pub start: String,
    pub end: String,
    /// Minutes east of UTC the wall-clock values are expressed in.
    #[serde(default)]
    pub tz_offset: i32,
}

/// POST /api/records: create a record.
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateRecordForm>,
) -> (StatusCode, Json<Value>) {
    let record = match parse_form(&form) {
        Ok(record) => record,
        Err(err) => return error_response(&err),
    };

    match state.records.create_record(&record).await {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "status": "created" }))),
        Err(err) => error_response(&err),
    }
}

fn parse_form(form: &CreateRecordForm) -> crate::error::Result<TimeRecord> {
    if form.email.trim().is_empty() {
        return Err(TimecardError::InvalidInput(
            "email must not be empty".to_string(),
        ));
    }
    let start = timefmt::parse_local_input(&form.start, form.tz_offset)?;
    let end = timefmt::parse_local_input(&form.end, form.tz_offset)?;
    Ok(TimeRecord::new(form.email.clone(), start, end))
}

fn error_response(err: &TimecardError) -> (StatusCode, Json<Value>) {
    let status = match err {
        TimecardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TimecardError::Backend(_) | TimecardError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        TimecardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::backend::RecordBackend;
    use crate::cache::RecordCache;
    use crate::config::CacheConfig;
    use crate::error::Result;

    /// Scripted backend for handler tests.
    struct ScriptedBackend {
        page: Mutex<Vec<TimeRecord>>,
        submit_calls: AtomicUsize,
        fetch_fails: bool,
        submit_fails: bool,
    }

    impl ScriptedBackend {
        fn returning(page: Vec<TimeRecord>) -> Self {
            Self {
                page: Mutex::new(page),
                submit_calls: AtomicUsize::new(0),
                fetch_fails: false,
                submit_fails: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl RecordBackend for ScriptedBackend {
        async fn fetch_page(&self, _: &str, _: u32, _: u32) -> Result<Vec<TimeRecord>> {
            if self.fetch_fails {
                return Err(TimecardError::BackendUnavailable("scripted".into()));
            }
            Ok(self.page.lock().unwrap().clone())
        }

        async fn submit_record(&self, _: &TimeRecord) -> Result<()> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            if self.submit_fails {
                return Err(TimecardError::Backend("scripted".into()));
            }
            Ok(())
        }
    }

    fn record(email: &str) -> TimeRecord {
        TimeRecord::new(
            email,
            timefmt::parse_backend_timestamp("2024-05-01T08:00:00.000+0000").unwrap(),
            timefmt::parse_backend_timestamp("2024-05-01T16:00:00.000+0000").unwrap(),
        )
    }

    fn state_over(backend: Arc<ScriptedBackend>) -> State<Arc<AppState>> {
        State(Arc::new(AppState {
            records: Arc::new(RecordCache::new(backend, &CacheConfig::default())),
            page_length: 2,
        }))
    }

    fn list_query(email: &str) -> Query<RecordsQuery> {
        Query(RecordsQuery {
            email: email.to_string(),
            offset: 0,
            length: None,
            tz_offset: 0,
        })
    }

    #[tokio::test]
    async fn test_get_records_formats_and_flags_full_page() {
        let backend = Arc::new(ScriptedBackend::returning(vec![
            record("a@x.com"),
            record("a@x.com"),
        ]));
        let (status, Json(body)) = get_records(state_over(backend), list_query("a@x.com")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_more"], true);
        assert_eq!(body["records"][0]["email"], "a@x.com");
        assert_eq!(body["records"][0]["start"], "2024-05-01 - 08:00");
        assert_eq!(body["records"][0]["end"], "2024-05-01 - 16:00");
    }

    #[tokio::test]
    async fn test_get_records_short_page_has_no_more() {
        let backend = Arc::new(ScriptedBackend::returning(vec![record("a@x.com")]));
        let (status, Json(body)) = get_records(state_over(backend), list_query("a@x.com")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_more"], false);
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_records_applies_tz_offset() {
        let backend = Arc::new(ScriptedBackend::returning(vec![record("a@x.com")]));
        let query = Query(RecordsQuery {
            email: "a@x.com".to_string(),
            offset: 0,
            length: None,
            tz_offset: 120,
        });
        let (_, Json(body)) = get_records(state_over(backend), query).await;
        assert_eq!(body["records"][0]["start"], "2024-05-01 - 10:00");
    }

    #[tokio::test]
    async fn test_get_records_blank_email_is_bad_request() {
        let backend = Arc::new(ScriptedBackend::returning(vec![]));
        let (status, Json(body)) = get_records(state_over(backend), list_query("   ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_get_records_zero_length_is_bad_request() {
        let backend = Arc::new(ScriptedBackend::returning(vec![]));
        let query = Query(RecordsQuery {
            email: "a@x.com".to_string(),
            offset: 0,
            length: Some(0),
            tz_offset: 0,
        });
        let (status, _) = get_records(state_over(backend), query).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_records_backend_failure_is_bad_gateway() {
        let mut backend = ScriptedBackend::returning(vec![]);
        backend.fetch_fails = true;
        let (status, Json(body)) =
            get_records(state_over(Arc::new(backend)), list_query("a@x.com")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_create_record_submits_and_returns_created() {
        let backend = Arc::new(ScriptedBackend::returning(vec![]));
        let form = Form(CreateRecordForm {
            email: "a@x.com".to_string(),
            start: "2024-05-01T10:00".to_string(),
            end: "2024-05-01T18:00".to_string(),
            tz_offset: 120,
        });
        let (status, Json(body)) = create_record(state_over(backend.clone()), form).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "created");
        assert_eq!(backend.submit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_record_bad_datetime_never_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::returning(vec![]));
        let form = Form(CreateRecordForm {
            email: "a@x.com".to_string(),
            start: "yesterday".to_string(),
            end: "2024-05-01T18:00".to_string(),
            tz_offset: 0,
        });
        let (status, _) = create_record(state_over(backend.clone()), form).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_record_backend_rejection_is_bad_gateway() {
        let mut scripted = ScriptedBackend::returning(vec![]);
        scripted.submit_fails = true;
        let backend = Arc::new(scripted);
        let form = Form(CreateRecordForm {
            email: "a@x.com".to_string(),
            start: "2024-05-01T10:00".to_string(),
            end: "2024-05-01T18:00".to_string(),
            tz_offset: 0,
        });
        let (status, Json(body)) = create_record(state_over(backend), form).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("rejected"));
    }

    #[test]
    fn test_parse_form_converts_to_utc() {
        let form = CreateRecordForm {
            email: "a@x.com".to_string(),
            start: "2024-05-01T10:00".to_string(),
            end: "2024-05-01T18:00".to_string(),
            tz_offset: 120,
        };
        let record = parse_form(&form).unwrap();
        assert_eq!(record.start.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert_eq!(record.end.to_rfc3339(), "2024-05-01T16:00:00+00:00");
    }
}
