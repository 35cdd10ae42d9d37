//! Terminal rendering for messages, source lists, the source detail view,
//! and the document list.
//!
//! Everything renders to a `String` so the CLI decides where it goes and
//! tests can compare output directly. With color off, highlights are marked
//! `>>like this<<`; with color on they are bold reverse video.

use doc_chat_core::citation::{FormattedMessage, Segment};
use doc_chat_core::excerpt::ExcerptView;
use doc_chat_core::models::{ChatMessage, Document, Role, SourceReference};

const BOLD_REVERSE: &str = "\x1b[1;7m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn highlight(&self, text: &str) -> String {
        if self.color {
            self.paint(BOLD_REVERSE, text)
        } else {
            format!(">>{}<<", text)
        }
    }

    /// Inline text of a formatted message with `[n]` markers.
    pub fn segments(&self, formatted: &FormattedMessage) -> String {
        let mut out = String::with_capacity(formatted.content.len() + 16);
        for segment in &formatted.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Highlight(t) => out.push_str(&self.highlight(t)),
                Segment::Citation(m) => {
                    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                        out.push(' ');
                    }
                    out.push_str(&self.paint(CYAN, &format!("[{}]", m.number)));
                    out.push(' ');
                }
            }
        }
        out.trim_end().to_string()
    }

    /// A full chat turn: speaker label, text, and the numbered source list.
    pub fn message(&self, message: &ChatMessage, formatted: &FormattedMessage) -> String {
        let label = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        let mut out = format!(
            "{} {}\n{}\n",
            self.paint(CYAN, &format!("{}:", label)),
            self.paint(DIM, &message.timestamp.format("%H:%M").to_string()),
            self.segments(formatted)
        );
        let cited = formatted.cited_sources();
        if !cited.is_empty() {
            out.push_str(&format!("\nSources ({}):\n", cited.len()));
            for (number, source) in cited {
                out.push_str(&format!("  [{}] {}\n", number, source_label(source)));
            }
        }
        out
    }

    /// The source detail view.
    pub fn excerpt(&self, number: usize, view: &ExcerptView) -> String {
        let mut out = String::new();
        out.push_str(&format!("--- Source Reference [{}] ---\n", number));
        out.push_str(&format!("Document:     {}\n", view.source.filename));
        if let Some(chunk) = view.source.chunk_index {
            out.push_str(&format!("chunk:        {}\n", chunk));
        }
        if let Some(score) = view.source.score {
            out.push_str(&format!("score:        {:.3}\n", score));
        }
        out.push('\n');
        out.push_str(&format!("--- {} ---\n", view.heading()));
        out.push_str(view.display_text());
        out.push('\n');
        if let Some(label) = view.toggle_label() {
            out.push_str(&self.paint(DIM, &format!("({}: /full)", label)));
            out.push('\n');
        }
        out
    }
}

/// `filename (chunk N)` for the source list.
pub fn source_label(source: &SourceReference) -> String {
    match source.chunk_index {
        Some(chunk) => format!("{} (chunk {})", source.filename, chunk),
        None => source.filename.clone(),
    }
}

/// The document list, or a placeholder when it is empty.
pub fn documents(docs: &[Document]) -> String {
    if docs.is_empty() {
        return "No documents uploaded yet.\n".to_string();
    }
    let mut out = format!("--- Documents ({}) ---\n", docs.len());
    for doc in docs {
        let date = doc
            .uploaded_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| doc.uploaded_at.clone());
        out.push_str(&format!("{:>4}  {}\n", doc.id, doc.filename));
        out.push_str(&format!("      {} \u{2022} {}\n", doc.file_type, date));
    }
    out
}
