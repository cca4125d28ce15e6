use std::sync::atomic::{AtomicI64, Ordering};

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::intake::assembler::{assemble, FormFields};
use crate::state::AppState;
use crate::uploads::{route_upload, RoutedFile};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub application_id: String,
}

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Upper bound on portfolio parts per submission; every other file slot
/// accepts a single part.
const MAX_PORTFOLIO_FILES: usize = 10;

fn max_files_for_field(name: &str) -> usize {
    if name == "portfolio" {
        MAX_PORTFOLIO_FILES
    } else {
        1
    }
}

/// Epoch-milliseconds id, bumped past the previous issue so two submissions
/// landing in the same millisecond still get distinct ids.
fn next_submission_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_ISSUED_MILLIS.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(prev + 1);
        match LAST_ISSUED_MILLIS.compare_exchange(
            prev,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

/// POST /api/submit-application
///
/// Walks the multipart body, buffering uploads and collecting text fields.
/// Every file is validated (slot allowlist, size cap) before anything is
/// written, so a rejected submission leaves both disk and store untouched.
/// Notification is handed to the background worker after the record is
/// persisted; its outcome never affects the response.
pub async fn handle_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let mut fields = FormFields::new();
    let mut uploads: Vec<(RoutedFile, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Malformed multipart body: {err}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(original) if !original.is_empty() => {
                let already = uploads.iter().filter(|(r, _)| r.field_name == name).count();
                if already >= max_files_for_field(&name) {
                    return Err(AppError::Validation(format!(
                        "Too many files for field {name}"
                    )));
                }
                let data = field.bytes().await.map_err(|err| {
                    AppError::Validation(format!("Failed to read upload {name}: {err}"))
                })?;
                let routed = route_upload(&name, &original, data.len())?;
                uploads.push((routed, data));
            }
            Some(_) => {
                // Browsers send an empty filename for untouched file inputs.
            }
            None => {
                let value = field.text().await.map_err(|err| {
                    AppError::Validation(format!("Failed to read field {name}: {err}"))
                })?;
                fields.push(name, value);
            }
        }
    }

    let mut stored = Vec::with_capacity(uploads.len());
    for (routed, data) in &uploads {
        state.uploads.save(routed, data).await?;
        stored.push(routed.clone());
    }

    let id = next_submission_id();
    let record = assemble(&fields, &stored, id.clone(), Utc::now());
    state.store.append(record.clone()).await?;

    info!(application_id = %id, files = stored.len(), "application submitted");
    state.notifier.enqueue(record);

    Ok(Json(SubmitResponse {
        success: true,
        message: "Application submitted successfully!".to_string(),
        application_id: id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    use crate::notify::mailer::NoopMailer;
    use crate::notify::{Notifier, NotifySettings};
    use crate::routes::build_router;
    use crate::store::ApplicationStore;
    use crate::uploads::UploadArea;

    const BOUNDARY: &str = "test-boundary";

    async fn test_state(dir: &TempDir) -> AppState {
        let store = ApplicationStore::new(dir.path().join("applications.json"));
        let uploads = UploadArea::new(dir.path().join("uploads"));
        uploads.ensure_directories().await.unwrap();
        let (notifier, _worker) = Notifier::spawn(Arc::new(NoopMailer), NotifySettings::default());
        AppState {
            store,
            uploads,
            notifier,
        }
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(name: &str, filename: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
        )
    }

    fn multipart_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/submit-application")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_submission_ids_unique_and_increasing() {
        let ids: Vec<i64> = (0..500)
            .map(|_| next_submission_id().parse().unwrap())
            .collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[tokio::test]
    async fn test_submit_application_end_to_end() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir).await;
        let app = build_router(state.clone());

        let mut body = String::new();
        body.push_str(&text_part("fullName", "Jane Doe"));
        body.push_str(&text_part("email", "jane@example.com"));
        body.push_str(&file_part("resume", "resume.pdf", "%PDF-1.4 fake resume"));
        // Untouched file input: empty filename, must be ignored.
        body.push_str(&file_part("coverLetter", "", ""));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let response = app.clone().oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["message"], "Application submitted successfully!");

        let id = json["applicationId"].as_str().unwrap().to_string();
        let record = state.store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(record.personal_info.full_name.as_deref(), Some("Jane Doe"));
        assert!(record.documents.cover_letter.is_none());

        let stored = record.documents.resume.unwrap();
        assert!(stored.starts_with("resume-") && stored.ends_with(".pdf"));
        let on_disk = dir.path().join("uploads").join("documents").join(&stored);
        assert_eq!(
            std::fs::read_to_string(on_disk).unwrap(),
            "%PDF-1.4 fake resume"
        );
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_file_type_and_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir).await;
        let app = build_router(state.clone());

        let mut body = String::new();
        body.push_str(&text_part("fullName", "Eve"));
        body.push_str(&file_part("resume", "resume.exe", "MZ"));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(
            json["message"],
            "Only PDF and Word documents are allowed (pdf, doc, docx)"
        );

        assert!(state.store.load().await.unwrap().is_empty());
        let documents = dir.path().join("uploads").join("documents");
        assert_eq!(std::fs::read_dir(documents).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_duplicate_single_slot_part() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir).await;
        let app = build_router(state.clone());

        let mut body = String::new();
        body.push_str(&file_part("resume", "first.pdf", "%PDF first"));
        body.push_str(&file_part("resume", "second.pdf", "%PDF second"));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Too many files for field resume");

        assert!(state.store.load().await.unwrap().is_empty());
        let documents = dir.path().join("uploads").join("documents");
        assert_eq!(std::fs::read_dir(documents).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_submit_accepts_multiple_portfolio_parts() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir).await;
        let app = build_router(state.clone());

        let mut body = String::new();
        body.push_str(&file_part("portfolio", "one.png", "png-1"));
        body.push_str(&file_part("portfolio", "two.pdf", "pdf-2"));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let records = state.store.load().await.unwrap();
        assert_eq!(records[0].portfolio.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_with_no_fields_still_succeeds() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir).await;
        let app = build_router(state.clone());

        let mut body = String::new();
        body.push_str(&text_part("location", "Nairobi"));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let records = state.store.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].personal_info.full_name.is_none());
        assert_eq!(records[0].personal_info.location.as_deref(), Some("Nairobi"));
    }
}
