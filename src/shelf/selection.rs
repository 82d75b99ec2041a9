use std::path::{Path, PathBuf};

use crate::db::IncomingFile;
use crate::error::UploadError;

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// One entry of a user's file selection.
///
/// Path-backed entries are only read when the upload reaches them.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    mime_type: Option<String>,
    source: FileSource,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        SelectedFile {
            name,
            mime_type: None,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        SelectedFile {
            name: name.into(),
            mime_type: Some(mime_type.into()),
            source: FileSource::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the file contents and settle its MIME type.
    pub async fn load(self) -> Result<IncomingFile, UploadError> {
        let bytes = match self.source {
            FileSource::Path(path) => {
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| UploadError::Read {
                        name: self.name.clone(),
                        source,
                    })?
            }
            FileSource::Memory(bytes) => bytes,
        };
        let mime_type = self
            .mime_type
            .unwrap_or_else(|| detect_mime_type(&self.name, &bytes));
        Ok(IncomingFile::new(self.name, mime_type, bytes))
    }
}

/// Sniff the MIME type from content, then fall back to the file extension.
pub fn detect_mime_type(name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let mime = match extension.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        _ => FALLBACK_MIME_TYPE,
    };
    mime.to_string()
}
