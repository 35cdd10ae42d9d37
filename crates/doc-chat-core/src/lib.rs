//! # Doc Chat Core
//!
//! Shared logic for the doc-chat client: wire models, the API trait with an
//! in-memory implementation, inline citation formatting, excerpt
//! highlighting, relevant-excerpt extraction, and session state.
//!
//! This crate performs no network or filesystem I/O. The HTTP client, the
//! terminal renderer, and the CLI live in the `doc-chat` crate.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Documents, sources, chat messages, uploads |
//! | [`api`] | `DocChatApi` trait, `ApiError`, `MemoryApi` |
//! | [`text`] | Sentence splitting |
//! | [`citation`] | Numbered citation markers and segment layout |
//! | [`highlight`] | Picking and applying the excerpt highlight |
//! | [`excerpt`] | Relevant-excerpt extraction and the detail view |
//! | [`library`] | Document list cache with upload/delete/clear flows |
//! | [`session`] | Conversation state and citation selection |

pub mod api;
pub mod citation;
pub mod excerpt;
pub mod highlight;
pub mod library;
pub mod models;
pub mod session;
pub mod text;
