//! Health endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::server::AppState;

/// GET /api/health: liveness plus basic cache occupancy.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.records.stats();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": {
            "entries": stats.entries,
            "oldest_inserted_at": stats.oldest_inserted_at,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::backend::RecordBackend;
    use crate::cache::RecordCache;
    use crate::config::CacheConfig;
    use crate::error::Result;
    use crate::record::TimeRecord;

    struct EmptyBackend;

    #[async_trait::async_trait]
    impl RecordBackend for EmptyBackend {
        async fn fetch_page(&self, _: &str, _: u32, _: u32) -> Result<Vec<TimeRecord>> {
            Ok(vec![])
        }

        async fn submit_record(&self, _: &TimeRecord) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_health_returns_ok() {
        let state = State(Arc::new(AppState {
            records: Arc::new(RecordCache::new(
                Arc::new(EmptyBackend),
                &CacheConfig::default(),
            )),
            page_length: 20,
        }));
        let Json(body) = get_health(state).await;
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
        assert_eq!(body["cache"]["entries"], 0);
    }
}
