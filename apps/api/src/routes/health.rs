use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Status object with service version plus a snapshot of the store file,
/// which is the first thing to check when submissions go missing.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.status().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "intake-api",
        "store": store
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use tempfile::tempdir;

    use crate::models::application::ApplicationRecord;
    use crate::notify::mailer::NoopMailer;
    use crate::notify::{Notifier, NotifySettings};
    use crate::store::ApplicationStore;
    use crate::uploads::UploadArea;

    #[tokio::test]
    async fn test_health_reports_store_snapshot() {
        let dir = tempdir().unwrap();
        let store = ApplicationStore::new(dir.path().join("applications.json"));
        let mut record = ApplicationRecord::new("123".to_string(), Utc::now());
        record.personal_info.full_name = Some("Jane Doe".to_string());
        store.append(record).await.unwrap();

        let uploads = UploadArea::new(dir.path().join("uploads"));
        let (notifier, _worker) = Notifier::spawn(Arc::new(NoopMailer), NotifySettings::default());
        let state = AppState {
            store,
            uploads,
            notifier,
        };

        let Json(value) = health_handler(State(state)).await;

        assert_eq!(value["status"], "ok");
        assert_eq!(value["service"], "intake-api");
        assert_eq!(value["store"]["exists"], json!(true));
        assert_eq!(value["store"]["records"], json!(1));
        assert_eq!(value["store"]["latest"]["id"], "123");
        assert_eq!(value["store"]["latest"]["fullName"], "Jane Doe");
        assert!(value["store"]["sizeBytes"].as_u64().unwrap() > 0);
    }
}
