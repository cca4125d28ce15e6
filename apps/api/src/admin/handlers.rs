use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::errors::AppError;
use crate::models::application::ApplicationRecord;
use crate::state::AppState;
use crate::uploads::{content_type_for, Category};

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationRecord>>, AppError> {
    let records = state.store.load().await?;
    Ok(Json(records))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let record = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct RatingUpdate {
    pub rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct NotesUpdate {
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
    pub application: ApplicationRecord,
}

/// POST /api/applications/:id/rating
pub async fn handle_set_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<RatingUpdate>,
) -> Result<Json<UpdateResponse>, AppError> {
    let application = state
        .store
        .replace_by_id(&id, |record| record.rating = Some(update.rating))
        .await?;
    info!(application_id = %id, rating = update.rating, "rating updated");
    Ok(Json(UpdateResponse {
        success: true,
        message: "Rating updated".to_string(),
        application,
    }))
}

/// POST /api/applications/:id/notes
pub async fn handle_set_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<NotesUpdate>,
) -> Result<Json<UpdateResponse>, AppError> {
    let application = state
        .store
        .replace_by_id(&id, |record| record.notes = Some(update.notes))
        .await?;
    info!(application_id = %id, "notes updated");
    Ok(Json(UpdateResponse {
        success: true,
        message: "Notes updated".to_string(),
        application,
    }))
}

/// POST /api/applications/:id/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<UpdateResponse>, AppError> {
    let application = state
        .store
        .replace_by_id(&id, |record| record.status = Some(update.status))
        .await?;
    info!(application_id = %id, "status updated");
    Ok(Json(UpdateResponse {
        success: true,
        message: "Status updated".to_string(),
        application,
    }))
}

/// GET /api/videos/:filename
pub async fn handle_get_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    serve_upload(&state, Category::Videos, &filename).await
}

/// GET /api/documents/:filename
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    serve_upload(&state, Category::Documents, &filename).await
}

/// GET /api/portfolio/:filename
pub async fn handle_get_portfolio_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    serve_upload(&state, Category::Portfolio, &filename).await
}

/// Byte-serves a stored upload. A name that fails the bare-filename check or
/// has no file behind it is a plain 404, never a server error.
async fn serve_upload(
    state: &AppState,
    category: Category,
    filename: &str,
) -> Result<impl IntoResponse, AppError> {
    let path = state
        .uploads
        .resolve(category, filename)
        .ok_or_else(|| AppError::NotFound(format!("File {filename} not found")))?;

    let data = match fs::read(&path).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("File {filename} not found")));
        }
        Err(err) => return Err(AppError::Internal(err.into())),
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(filename))], data))
}
