//! Routes incoming uploads to a category directory by multipart field name,
//! enforces per-slot extension allowlists and the per-file size cap, and
//! generates collision-free stored filenames.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use crate::errors::AppError;

/// Per-file cap, checked on the buffered bytes before anything hits disk.
pub const MAX_FILE_MIB: u64 = 100;
pub const MAX_FILE_BYTES: usize = (MAX_FILE_MIB as usize) * 1024 * 1024;

/// Whole-request body limit: two videos plus documents and portfolio.
pub const MAX_REQUEST_BYTES: usize = 512 * 1024 * 1024;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "wmv", "webm"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];
const PORTFOLIO_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png", "zip"];
const ANY_UPLOAD_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "wmv", "webm", "pdf", "doc", "docx", "jpg", "jpeg", "png", "zip",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Videos,
    Documents,
    Portfolio,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Videos,
        Category::Documents,
        Category::Portfolio,
        Category::Other,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Videos => "videos",
            Category::Documents => "documents",
            Category::Portfolio => "portfolio",
            Category::Other => "other",
        }
    }
}

/// Destination derived from a multipart field name.
#[derive(Debug, Clone)]
struct Slot {
    category: Category,
    prefix: String,
    allowed: &'static [&'static str],
}

fn slot_for_field(field_name: &str) -> Slot {
    match field_name {
        "video1" | "video2" => Slot {
            category: Category::Videos,
            prefix: field_name.to_string(),
            allowed: VIDEO_EXTENSIONS,
        },
        "resume" => Slot {
            category: Category::Documents,
            prefix: "resume".to_string(),
            allowed: DOCUMENT_EXTENSIONS,
        },
        "coverLetter" => Slot {
            category: Category::Documents,
            prefix: "cover-letter".to_string(),
            allowed: DOCUMENT_EXTENSIONS,
        },
        "portfolio" => Slot {
            category: Category::Portfolio,
            prefix: "portfolio".to_string(),
            allowed: PORTFOLIO_EXTENSIONS,
        },
        other => Slot {
            category: Category::Other,
            prefix: sanitize_prefix(other),
            allowed: ANY_UPLOAD_EXTENSIONS,
        },
    }
}

fn rejection_message(category: Category) -> String {
    match category {
        Category::Videos => "Only video files are allowed (mp4, mov, avi, wmv, webm)".to_string(),
        Category::Documents => {
            "Only PDF and Word documents are allowed (pdf, doc, docx)".to_string()
        }
        Category::Portfolio => {
            "Only documents and images are allowed (pdf, doc, docx, jpg, jpeg, png, zip)"
                .to_string()
        }
        Category::Other => "File type is not allowed".to_string(),
    }
}

fn sanitize_prefix(field_name: &str) -> String {
    let cleaned: String = field_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

fn extension_of(original_name: &str) -> Option<&str> {
    Path::new(original_name).extension().and_then(OsStr::to_str)
}

/// Nine decimal digits derived from a fresh v4 uuid.
fn random_suffix() -> u32 {
    (Uuid::new_v4().as_u128() % 1_000_000_000) as u32
}

/// An upload that passed validation, with its generated stored filename.
#[derive(Debug, Clone)]
pub struct RoutedFile {
    pub field_name: String,
    pub category: Category,
    pub stored_name: String,
}

/// Validates an upload against its slot and names it
/// `<prefix>-<epoch-millis>-<nine digits>.<ext>`. The extension check is
/// case-insensitive; the original extension is preserved in the stored name.
pub fn route_upload(
    field_name: &str,
    original_name: &str,
    size: usize,
) -> Result<RoutedFile, AppError> {
    let slot = slot_for_field(field_name);

    let ext = extension_of(original_name).unwrap_or("");
    if !slot.allowed.contains(&ext.to_lowercase().as_str()) {
        return Err(AppError::Validation(rejection_message(slot.category)));
    }

    if size > MAX_FILE_BYTES {
        return Err(AppError::FileTooLarge {
            limit_mib: MAX_FILE_MIB,
        });
    }

    let stored_name = format!(
        "{}-{}-{:09}.{}",
        slot.prefix,
        Utc::now().timestamp_millis(),
        random_suffix(),
        ext
    );

    Ok(RoutedFile {
        field_name: field_name.to_string(),
        category: slot.category,
        stored_name,
    })
}

/// Root of the upload tree, one subdirectory per category.
#[derive(Debug, Clone)]
pub struct UploadArea {
    root: PathBuf,
}

impl UploadArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_directories(&self) -> std::io::Result<()> {
        for category in Category::ALL {
            fs::create_dir_all(self.root.join(category.dir_name())).await?;
        }
        Ok(())
    }

    /// Maps a bare filename to its on-disk path. Names carrying separators or
    /// parent components resolve to `None`, so traversal never reaches disk.
    pub fn resolve(&self, category: Category, filename: &str) -> Option<PathBuf> {
        if filename.is_empty() || Path::new(filename).file_name() != Some(OsStr::new(filename)) {
            return None;
        }
        Some(self.root.join(category.dir_name()).join(filename))
    }

    pub async fn save(&self, routed: &RoutedFile, data: &[u8]) -> Result<PathBuf, AppError> {
        let path = self
            .resolve(routed.category, &routed.stored_name)
            .ok_or_else(|| {
                AppError::Validation(format!("Invalid stored filename {}", routed.stored_name))
            })?;
        fs::write(&path, data)
            .await
            .with_context(|| format!("writing upload {}", path.display()))?;
        Ok(path)
    }
}

/// Content type for byte-serving, inferred from the stored filename.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).unwrap_or("").to_lowercase().as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
