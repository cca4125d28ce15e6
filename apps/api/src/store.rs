//! Flat-file JSON store for submitted applications.
//!
//! All records live in one pretty-printed JSON array. Every mutation is a
//! whole-file read-modify-write; there is no locking, so concurrent writers
//! race and the last one wins. A missing or unreadable file degrades to an
//! empty store rather than taking intake down.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{error, warn};

use crate::models::application::ApplicationRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("application {0} not found in store")]
    NotFound(String),
    #[error("store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Snapshot of the store file for the health endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub exists: bool,
    pub size_bytes: u64,
    pub records: usize,
    pub latest: Option<LatestApplication>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestApplication {
    pub id: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApplicationStore {
    path: PathBuf,
}

impl ApplicationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full array. A missing file is created empty; an unparseable
    /// file is logged and treated as empty so intake keeps accepting.
    pub async fn load(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.persist(&[]).await?;
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "store file unparseable, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Appends one record and rewrites the whole file. After the write the
    /// file is read back and the lengths compared; a mismatch is logged but
    /// never fails the call.
    pub async fn append(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        records.push(record);
        self.persist(&records).await?;

        match self.load().await {
            Ok(reread) if reread.len() != records.len() => {
                error!(
                    path = %self.path.display(),
                    expected = records.len(),
                    found = reread.len(),
                    "store length mismatch after append"
                );
            }
            Ok(_) => {}
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "post-append verification read failed");
            }
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ApplicationRecord>, StoreError> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|record| record.id == id))
    }

    /// Applies a field-level mutation to the record with the given id and
    /// persists the whole array. Returns the updated record.
    pub async fn replace_by_id<F>(&self, id: &str, mutate: F) -> Result<ApplicationRecord, StoreError>
    where
        F: FnOnce(&mut ApplicationRecord),
    {
        let mut records = self.load().await?;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        mutate(record);
        let updated = record.clone();
        self.persist(&records).await?;
        Ok(updated)
    }

    pub async fn status(&self) -> StoreStatus {
        let size_bytes = match fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(_) => {
                return StoreStatus {
                    exists: false,
                    size_bytes: 0,
                    records: 0,
                    latest: None,
                };
            }
        };

        let records = match self.load().await {
            Ok(records) => records,
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "status read failed");
                Vec::new()
            }
        };
        let latest = records.last().map(|record| LatestApplication {
            id: record.id.clone(),
            submitted_at: record.submitted_at,
            full_name: record.personal_info.full_name.clone(),
            email: record.personal_info.email.clone(),
        });

        StoreStatus {
            exists: true,
            size_bytes,
            records: records.len(),
            latest,
        }
    }

    async fn persist(&self, records: &[ApplicationRecord]) -> Result<(), StoreError> {
        let pretty = serde_json::to_vec_pretty(records)?;
        fs::write(&self.path, pretty).await?;
        Ok(())
    }
}
