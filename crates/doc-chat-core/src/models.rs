//! Core data models shared by the client, the formatter, and session state.
//!
//! Wire types ([`Document`], [`SourceReference`], [`ChatReply`]) mirror the
//! JSON shapes served by the document-intelligence API. [`ChatMessage`] is
//! created client-side and never leaves the process.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A cited excerpt of a document returned alongside a chat answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReference {
    #[serde(default)]
    pub document_id: Option<i64>,
    pub filename: String,
    /// Excerpt text the answer was grounded on.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub chunk_index: Option<i64>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl SourceReference {
    /// Identity key used to decide whether two references denote the same source.
    pub fn key(&self) -> SourceKey {
        match self.document_id {
            Some(id) => SourceKey::Document(id),
            None => SourceKey::File(self.filename.clone()),
        }
    }
}

/// Identity of a cited source: the document id when present, else the filename.
///
/// Ids and filenames live in separate variants, so a file literally named
/// `"7"` never collides with document 7.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Document(i64),
    File(String),
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKey::Document(id) => write!(f, "document:{}", id),
            SourceKey::File(name) => write!(f, "file:{}", name),
        }
    }
}

/// One turn of the conversation. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<SourceReference>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), Vec::new())
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<SourceReference>) -> Self {
        Self::new(Role::Assistant, content.into(), sources)
    }

    fn new(role: Role, content: String, sources: Vec<SourceReference>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            sources,
        }
    }

    /// True for assistant messages that carry at least one source.
    pub fn has_citations(&self) -> bool {
        self.role == Role::Assistant && !self.sources.is_empty()
    }
}

/// An uploaded document as stored by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    /// Upload time exactly as sent by the API (ISO 8601, with or without offset).
    pub uploaded_at: String,
}

impl Document {
    /// Calendar date of the upload, if the timestamp parses.
    pub fn uploaded_date(&self) -> Option<NaiveDate> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.uploaded_at) {
            return Some(dt.date_naive());
        }
        NaiveDateTime::parse_from_str(&self.uploaded_at, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| dt.date())
            .ok()
    }
}

/// Body of a successful `POST /chat/` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// Missing or `null` both mean no sources.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<SourceReference>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Lower-cased extension including the leading dot (e.g. `".pdf"`).
    pub fn extension(&self) -> Option<String> {
        let dot = self.filename.rfind('.')?;
        if dot == 0 || dot + 1 == self.filename.len() {
            return None;
        }
        Some(self.filename[dot..].to_lowercase())
    }
}
