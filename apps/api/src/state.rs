use crate::notify::Notifier;
use crate::store::ApplicationStore;
use crate::uploads::UploadArea;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Flat-file record store (one JSON array on disk).
    pub store: ApplicationStore,
    /// Upload tree with one subdirectory per file category.
    pub uploads: UploadArea,
    /// Queue handle for the background notification worker.
    pub notifier: Notifier,
}
