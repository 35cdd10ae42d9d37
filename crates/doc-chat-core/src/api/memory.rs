//! In-memory [`DocChatApi`] implementation for tests and offline use.
//!
//! Documents live in a `Vec` behind `std::sync::RwLock`. Chat replies are
//! served from a scripted queue; once it is empty the API answers with a
//! canned "no context" reply. Failures can be injected per operation or for
//! everything at once (`set_offline`).

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::{ApiError, ApiResult, DocChatApi, DELETE_FAILED};
use crate::library::{content_type_for, ALLOWED_EXTENSIONS};
use crate::models::{ChatReply, Document, UploadFile};

/// Reply used when no scripted reply is queued.
pub const DEFAULT_REPLY: &str = "I could not find anything relevant in the uploaded documents.";

/// The five API operations, used to target failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Upload,
    Delete,
    ClearAll,
    Chat,
}

#[derive(Default)]
struct State {
    documents: Vec<Document>,
    next_id: i64,
    replies: VecDeque<ChatReply>,
    failures: HashMap<Operation, ApiError>,
    offline: bool,
    calls: HashMap<Operation, usize>,
    messages: Vec<String>,
}

/// In-process stand-in for the remote API.
pub struct MemoryApi {
    state: RwLock<State>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// Seed a stored document as if it had been uploaded earlier.
    pub fn with_document(self, filename: &str) -> Self {
        {
            let mut state = self.write();
            let doc = new_document(&mut state, filename);
            state.documents.push(doc);
        }
        self
    }

    /// Queue a reply for the next chat call.
    pub fn push_reply(&self, reply: ChatReply) {
        self.write().replies.push_back(reply);
    }

    /// Make every later call to `op` fail with `error` until cleared.
    pub fn fail(&self, op: Operation, error: ApiError) {
        self.write().failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.write().failures.clear();
    }

    /// Simulate a network outage: every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.write().offline = offline;
    }

    /// Number of calls made to `op`, including failed ones.
    pub fn calls(&self, op: Operation) -> usize {
        self.read().calls.get(&op).copied().unwrap_or(0)
    }

    /// Chat messages received, in order.
    pub fn received_messages(&self) -> Vec<String> {
        self.read().messages.clone()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.read().documents.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call and return the injected failure, if any.
    fn enter(&self, op: Operation) -> ApiResult<std::sync::RwLockWriteGuard<'_, State>> {
        let mut state = self.write();
        *state.calls.entry(op).or_insert(0) += 1;
        if state.offline {
            return Err(ApiError::Transport(
                "error sending request: connection refused".to_string(),
            ));
        }
        if let Some(err) = state.failures.get(&op) {
            return Err(err.clone());
        }
        Ok(state)
    }
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

fn new_document(state: &mut State, filename: &str) -> Document {
    let id = state.next_id;
    state.next_id += 1;
    let extension = filename
        .rfind('.')
        .map(|i| filename[i..].to_lowercase())
        .unwrap_or_default();
    Document {
        id,
        filename: filename.to_string(),
        file_type: content_type_for(&extension)
            .map(str::to_string)
            .unwrap_or(extension),
        uploaded_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    }
}

#[async_trait]
impl DocChatApi for MemoryApi {
    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        let state = self.enter(Operation::List)?;
        Ok(state.documents.clone())
    }

    async fn upload_document(&self, file: UploadFile) -> ApiResult<Document> {
        let mut state = self.enter(Operation::Upload)?;
        if file.filename.is_empty() {
            return Err(ApiError::rejected(400, "No file provided"));
        }
        let allowed = file
            .extension()
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if !allowed {
            return Err(ApiError::rejected(
                400,
                "Unsupported file type. Allowed types: PDF, CSV, XLS, XLSX, DOCX",
            ));
        }
        let doc = new_document(&mut state, &file.filename);
        state.documents.push(doc.clone());
        Ok(doc)
    }

    async fn delete_document(&self, id: i64) -> ApiResult<()> {
        let mut state = self.enter(Operation::Delete)?;
        let before = state.documents.len();
        state.documents.retain(|d| d.id != id);
        if state.documents.len() == before {
            return Err(ApiError::rejected(404, DELETE_FAILED));
        }
        Ok(())
    }

    async fn clear_all_documents(&self) -> ApiResult<()> {
        let mut state = self.enter(Operation::ClearAll)?;
        state.documents.clear();
        Ok(())
    }

    async fn send_chat(&self, message: &str) -> ApiResult<ChatReply> {
        let mut state = self.enter(Operation::Chat)?;
        state.messages.push(message.to_string());
        Ok(state.replies.pop_front().unwrap_or_else(|| ChatReply {
            response: DEFAULT_REPLY.to_string(),
            sources: Vec::new(),
        }))
    }
}
