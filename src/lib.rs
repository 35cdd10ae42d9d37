//! # doc-chat
//!
//! Terminal client for a document-intelligence chat API. Upload documents,
//! ask questions, and get answers with numbered inline citations; open a
//! citation to see the passage it came from, trimmed to the sentences that
//! matter for your question.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌────────────────────┐   ┌──────────────┐
//! │ CLI (docchat) │──▶│  doc-chat-core     │──▶│  DocChatApi  │
//! │ ask/chat/docs │   │ session, library,  │   │ HttpApi or   │
//! └───────────────┘   │ citation, excerpt  │   │ MemoryApi    │
//!                     └────────────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docchat docs upload ./reports/q3.pdf
//! docchat ask "How did quarterly revenue change?" --source 1
//! docchat chat
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`client`] | HTTP implementation of the API trait |
//! | [`render`] | Terminal rendering of answers, sources, and documents |
//! | [`documents`] | `docs` subcommands |
//! | [`chat`] | `ask` and the interactive `chat` loop |
//! | [`logging`] | `tracing` subscriber setup |

pub mod chat;
pub mod client;
pub mod config;
pub mod documents;
pub mod logging;
pub mod render;
