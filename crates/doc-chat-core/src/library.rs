//! Document library state: the cached document list and the upload,
//! delete, and clear-all flows that keep it in sync with the API.
//!
//! The cache is eventually consistent. Every successful mutation is followed
//! by a refresh; a failed refresh leaves the previous list in place.

use tracing::{debug, info, warn};

use crate::api::{ApiError, DocChatApi};
use crate::models::{Document, UploadFile};

/// Extensions accepted by the upload filter.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".csv", ".xls", ".xlsx", ".docx"];

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this document?";
pub const CLEAR_PROMPT: &str = "Are you sure you want to delete all documents?";

/// MIME type the API expects for an allowed extension (with leading dot).
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        ".pdf" => Some("application/pdf"),
        ".csv" => Some("text/csv"),
        ".xls" => Some("application/vnd.ms-excel"),
        ".xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        ".docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of an upload attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Uploaded(Document),
    /// Stopped before any request: the extension is not allowed, or another
    /// upload is still running.
    Rejected { filename: String },
    Failed(ApiError),
}

/// Result of a confirmed destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Cancelled,
}

/// Client-side view of the remote document store.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    documents: Vec<Document>,
    is_loading: bool,
    is_uploading: bool,
    upload_error: Option<String>,
    allowed_extensions: Vec<String>,
}

impl DocumentLibrary {
    pub fn new() -> Self {
        Self::with_allowed_extensions(ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }

    pub fn with_allowed_extensions(allowed_extensions: Vec<String>) -> Self {
        Self {
            documents: Vec::new(),
            is_loading: true,
            is_uploading: false,
            upload_error: None,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// True until the first refresh completes, whatever its outcome.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    /// Message of the last failed upload, cleared when a new upload starts.
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    /// Whether the upload filter lets `filename` through.
    pub fn accepts(&self, filename: &str) -> bool {
        UploadFile::new(filename, Vec::new())
            .extension()
            .map(|ext| self.allowed_extensions.contains(&ext))
            .unwrap_or(false)
    }

    /// Reload the document list. Returns whether the list was replaced.
    pub async fn refresh(&mut self, api: &dyn DocChatApi) -> bool {
        let result = api.list_documents().await;
        self.is_loading = false;
        match result {
            Ok(docs) => {
                debug!(count = docs.len(), "document list refreshed");
                self.documents = docs;
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to load documents");
                false
            }
        }
    }

    /// Upload `file` if the filter accepts it, then refresh the list.
    pub async fn upload(&mut self, api: &dyn DocChatApi, file: UploadFile) -> UploadOutcome {
        if self.is_uploading {
            debug!(filename = %file.filename, "upload already in progress");
            return UploadOutcome::Rejected {
                filename: file.filename,
            };
        }
        if !self.accepts(&file.filename) {
            debug!(filename = %file.filename, "upload rejected by extension filter");
            return UploadOutcome::Rejected {
                filename: file.filename,
            };
        }

        self.is_uploading = true;
        self.upload_error = None;
        let filename = file.filename.clone();
        let result = api.upload_document(file).await;

        let outcome = match result {
            Ok(doc) => {
                info!(id = doc.id, filename = %doc.filename, "document uploaded");
                self.refresh(api).await;
                UploadOutcome::Uploaded(doc)
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "upload failed");
                self.upload_error = Some(e.to_string());
                UploadOutcome::Failed(e)
            }
        };
        self.is_uploading = false;
        outcome
    }

    /// Delete one document after confirmation, then refresh.
    ///
    /// Errors are returned for the caller to show as a blocking alert.
    pub async fn delete(
        &mut self,
        api: &dyn DocChatApi,
        id: i64,
        confirm: &dyn Confirm,
    ) -> Result<Removal, ApiError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(Removal::Cancelled);
        }
        api.delete_document(id).await?;
        info!(id, "document deleted");
        self.refresh(api).await;
        Ok(Removal::Removed)
    }

    /// Delete every document after confirmation, then refresh.
    pub async fn clear_all(
        &mut self,
        api: &dyn DocChatApi,
        confirm: &dyn Confirm,
    ) -> Result<Removal, ApiError> {
        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(Removal::Cancelled);
        }
        api.clear_all_documents().await?;
        info!("all documents cleared");
        self.refresh(api).await;
        Ok(Removal::Removed)
    }
}

impl Default for DocumentLibrary {
    fn default() -> Self {
        Self::new()
    }
}
