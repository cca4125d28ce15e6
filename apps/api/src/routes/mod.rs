pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::intake::handlers as intake;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        // Intake
        .route("/api/submit-application", post(intake::handle_submit))
        // Review dashboard
        .route("/api/applications", get(admin::handle_list_applications))
        .route("/api/applications/:id", get(admin::handle_get_application))
        .route(
            "/api/applications/:id/rating",
            post(admin::handle_set_rating),
        )
        .route("/api/applications/:id/notes", post(admin::handle_set_notes))
        .route(
            "/api/applications/:id/status",
            post(admin::handle_set_status),
        )
        // Stored files
        .route("/api/videos/:filename", get(admin::handle_get_video))
        .route("/api/documents/:filename", get(admin::handle_get_document))
        .route(
            "/api/portfolio/:filename",
            get(admin::handle_get_portfolio_file),
        )
        .with_state(state)
}
