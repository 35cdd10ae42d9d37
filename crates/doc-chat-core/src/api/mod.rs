//! Boundary to the remote document-intelligence API.
//!
//! The [`DocChatApi`] trait lists every call the client makes. The HTTP
//! implementation lives in the `doc-chat` crate; [`memory::MemoryApi`] is an
//! in-process implementation for tests and offline embedding.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ChatReply, Document, UploadFile};

/// Fallback messages used when the API gives no detail.
pub const FETCH_FAILED: &str = "Failed to fetch documents";
pub const UPLOAD_FAILED: &str = "Failed to upload document";
pub const DELETE_FAILED: &str = "Failed to delete document";
pub const CLEAR_FAILED: &str = "Failed to clear all documents";
pub const SEND_FAILED: &str = "Failed to send message";

/// Failure of a single API call.
///
/// The `Display` output is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset).
    #[error("{0}")]
    Transport(String),
    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// A 2xx response whose body did not have the expected shape.
    #[error("Invalid response from server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a rejected call.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Every remote operation the client performs.
#[async_trait]
pub trait DocChatApi: Send + Sync {
    /// `GET /documents/`
    async fn list_documents(&self) -> ApiResult<Vec<Document>>;

    /// `POST /documents/upload` with multipart field `file`.
    async fn upload_document(&self, file: UploadFile) -> ApiResult<Document>;

    /// `DELETE /documents/{id}`
    async fn delete_document(&self, id: i64) -> ApiResult<()>;

    /// `DELETE /documents/clear-all`
    async fn clear_all_documents(&self) -> ApiResult<()>;

    /// `POST /chat/` with `{"message": ...}`.
    async fn send_chat(&self, message: &str) -> ApiResult<ChatReply>;
}
