//! Context file uploads.
//!
//! A file is accepted when its type is textual and it is at most
//! [`MAX_UPLOAD_BYTES`] long. Both checks use metadata only, so a rejected
//! file is never opened for reading.

use mime_guess::mime::{self, Mime};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::error::ToolError;

/// Upload size limit (1 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Message shown for non-text files.
pub const NOT_TEXT_MESSAGE: &str = "Please upload a text file (e.g., .txt, .md).";

/// Message shown for files over the limit.
pub const TOO_LARGE_MESSAGE: &str = "File size exceeds 1MB limit.";

/// MIME type for a path, guessed from its extension.
pub fn mime_for_path(path: &Path) -> Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

/// What was learned about a file before reading it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadInfo {
    pub mime: String,
    pub size: u64,
}

/// Check type and size without reading the file.
pub async fn check_upload(path: &Path) -> Result<UploadInfo, ToolError> {
    let mime = mime_for_path(path);
    if mime.type_() != mime::TEXT {
        warn!(path = %path.display(), mime = %mime, "Rejected upload: not a text file");
        return Err(ToolError::validation("file", NOT_TEXT_MESSAGE));
    }

    let metadata = tokio::fs::metadata(path).await.map_err(|e| ToolError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    if !metadata.is_file() {
        return Err(ToolError::validation("file", "Path is not a regular file."));
    }

    let size = metadata.len();
    if size > MAX_UPLOAD_BYTES {
        warn!(path = %path.display(), size, "Rejected upload: over size limit");
        return Err(ToolError::validation("file", TOO_LARGE_MESSAGE));
    }

    Ok(UploadInfo {
        mime: mime.to_string(),
        size,
    })
}

/// Validate and read a context file in full.
pub async fn read_context_file(path: &Path) -> Result<String, ToolError> {
    let upload = check_upload(path).await?;

    let bytes = tokio::fs::read(path).await.map_err(|e| ToolError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    info!(
        path = %path.display(),
        mime = %upload.mime,
        bytes = upload.size,
        "Context file loaded"
    );
    Ok(text)
}
