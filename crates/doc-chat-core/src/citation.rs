//! Inline citation formatting for assistant answers.
//!
//! Turns an answer and its ordered source list into display [`Segment`]s:
//! plain text, highlighted spans, and numbered [`CitationMarker`]s placed
//! between sentences.
//!
//! # Numbering
//!
//! Sources are numbered by identity key ([`SourceKey`]) in first-occurrence
//! order starting at 1. Every marker bound to the same key shows the same
//! number, however many times that source is cited.
//!
//! # Placement
//!
//! 1. Split the answer into sentence units (see [`split_sentences`]).
//! 2. `per_sentence = ceil(sources / max(non_empty_units, 1))`.
//! 3. After unit `idx`, place the next source's marker when
//!    `idx % per_sentence == 0` or `idx` is the second-to-last unit, as long
//!    as sources remain.
//! 4. Markers for any sources still unplaced go after the final unit.
//!
//! Exactly one marker is placed per entry of the source list.
//!
//! # Example
//!
//! ```rust
//! use doc_chat_core::citation::{format_content, Segment};
//! use doc_chat_core::models::SourceReference;
//!
//! let source = SourceReference {
//!     document_id: Some(1),
//!     filename: "report.pdf".into(),
//!     text: "Revenue grew 12% year over year.".into(),
//!     chunk_index: Some(0),
//!     score: None,
//! };
//! let formatted = format_content("Revenue grew. Costs fell.", &[source], "", None);
//! assert_eq!(formatted.markers().count(), 1);
//! assert!(matches!(formatted.segments[1], Segment::Citation(_)));
//! ```

use std::collections::HashMap;

use crate::highlight::{highlight_unit, ActiveHighlight};
use crate::models::{ChatMessage, SourceKey, SourceReference};
use crate::text::split_sentences;

/// One piece of a rendered message.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    /// Text matching the active highlight target.
    Highlight(String),
    Citation(CitationMarker),
}

/// A clickable, numbered reference to one source.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationMarker {
    /// Display number shared by all markers with the same identity key.
    pub number: usize,
    /// Position of the bound entry in the message's source list.
    pub slot: usize,
    pub source: SourceReference,
}

/// A message laid out for display, with the context needed to open a source.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedMessage {
    /// Full text of the answer.
    pub content: String,
    /// The user turn that produced the answer (empty when there was none).
    pub question: String,
    pub segments: Vec<Segment>,
}

impl FormattedMessage {
    /// Citation markers in display order.
    pub fn markers(&self) -> impl Iterator<Item = &CitationMarker> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Citation(m) => Some(m),
            _ => None,
        })
    }

    /// First marker showing citation number `number`.
    pub fn marker_by_number(&self, number: usize) -> Option<&CitationMarker> {
        self.markers().find(|m| m.number == number)
    }

    /// One entry per distinct citation number, ascending.
    pub fn cited_sources(&self) -> Vec<(usize, &SourceReference)> {
        let mut seen: Vec<(usize, &SourceReference)> = Vec::new();
        for m in self.markers() {
            if !seen.iter().any(|(n, _)| *n == m.number) {
                seen.push((m.number, &m.source));
            }
        }
        seen.sort_by_key(|(n, _)| *n);
        seen
    }
}

/// Assign citation numbers by identity key in first-occurrence order.
pub fn citation_numbers(sources: &[SourceReference]) -> HashMap<SourceKey, usize> {
    let mut numbers = HashMap::new();
    for source in sources {
        let next = numbers.len() + 1;
        numbers.entry(source.key()).or_insert(next);
    }
    numbers
}

/// Format a chat message. Only assistant messages with sources get markers.
pub fn format_message(
    message: &ChatMessage,
    question: &str,
    highlight: Option<&ActiveHighlight>,
) -> FormattedMessage {
    if !message.has_citations() {
        return FormattedMessage {
            content: message.content.clone(),
            question: question.to_string(),
            segments: vec![Segment::Text(message.content.clone())],
        };
    }
    format_content(&message.content, &message.sources, question, highlight)
}

/// Format an answer against its sources, applying `highlight` when it
/// targets one of them.
pub fn format_content(
    content: &str,
    sources: &[SourceReference],
    question: &str,
    highlight: Option<&ActiveHighlight>,
) -> FormattedMessage {
    let mut segments = Vec::new();

    if sources.is_empty() {
        segments.push(Segment::Text(content.to_string()));
        return FormattedMessage {
            content: content.to_string(),
            question: question.to_string(),
            segments,
        };
    }

    let numbers = citation_numbers(sources);
    let target = highlight
        .filter(|h| h.applies_to(sources))
        .map(|h| h.target.as_str());

    let units = split_sentences(content);
    let non_empty = units.iter().filter(|u| !u.trim().is_empty()).count();
    let per_sentence = sources.len().div_ceil(non_empty.max(1));
    let penultimate = units.len().checked_sub(2);

    let marker = |slot: usize| {
        let index = slot % sources.len();
        let source = &sources[index];
        Segment::Citation(CitationMarker {
            number: numbers.get(&source.key()).copied().unwrap_or(1),
            slot: index,
            source: source.clone(),
        })
    };

    let mut source_index = 0;
    for (idx, unit) in units.iter().enumerate() {
        if unit.trim().is_empty() {
            segments.push(Segment::Text(unit.to_string()));
            continue;
        }

        match target {
            Some(t) => segments.extend(highlight_unit(unit, t)),
            None => segments.push(Segment::Text(unit.to_string())),
        }

        if source_index < sources.len()
            && (idx % per_sentence == 0 || Some(idx) == penultimate)
        {
            segments.push(marker(source_index));
            source_index += 1;
        }
    }

    while source_index < sources.len() {
        segments.push(marker(source_index));
        source_index += 1;
    }

    FormattedMessage {
        content: content.to_string(),
        question: question.to_string(),
        segments,
    }
}
