//! Excerpt highlighting.
//!
//! When a citation marker is activated, [`highlight_target`] picks the piece
//! of the cited excerpt that also appears in the answer. While that source
//! stays selected, every message citing it renders matches of the target as
//! [`Segment::Highlight`] spans.
//!
//! # Target selection
//!
//! 1. Lower-case the excerpt and the answer.
//! 2. Split the excerpt on whitespace and drop tokens of 3 characters or fewer.
//! 3. Slide a 3-token window over the survivors; the first window whose
//!    space-joined phrase occurs in the answer wins.
//! 4. Otherwise the first surviving token longer than 5 characters that
//!    occurs in the answer.
//! 5. Otherwise nothing is highlighted.

use regex::RegexBuilder;

use crate::citation::Segment;
use crate::models::{SourceKey, SourceReference};
use crate::text::char_len;

const MIN_TOKEN_CHARS: usize = 4;
const PHRASE_TOKENS: usize = 3;
const FALLBACK_MIN_CHARS: usize = 6;

/// The highlight currently applied to messages citing `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHighlight {
    pub key: SourceKey,
    /// Lower-case phrase or word to emphasize.
    pub target: String,
}

impl ActiveHighlight {
    /// Compute the highlight for `source` against the answer it was cited in.
    pub fn for_source(source: &SourceReference, content: &str) -> Option<Self> {
        highlight_target(&source.text, content).map(|target| Self {
            key: source.key(),
            target,
        })
    }

    /// True when `sources` contains the highlighted source.
    pub fn applies_to(&self, sources: &[SourceReference]) -> bool {
        sources.iter().any(|s| s.key() == self.key)
    }
}

/// Pick the text to highlight in `content` for a citation of `excerpt`.
pub fn highlight_target(excerpt: &str, content: &str) -> Option<String> {
    if excerpt.is_empty() || content.is_empty() {
        return None;
    }

    let excerpt = excerpt.to_lowercase();
    let content = content.to_lowercase();
    let words: Vec<&str> = excerpt
        .split_whitespace()
        .filter(|w| char_len(w) >= MIN_TOKEN_CHARS)
        .collect();

    let phrase = words
        .windows(PHRASE_TOKENS)
        .map(|w| w.join(" "))
        .find(|phrase| content.contains(phrase.as_str()));
    if phrase.is_some() {
        return phrase;
    }

    words
        .iter()
        .find(|w| char_len(w) >= FALLBACK_MIN_CHARS && content.contains(*w))
        .map(|w| w.to_string())
}

/// Split `unit` around case-insensitive matches of `target`.
///
/// Matched pieces keep the casing of `unit`. Returns a single text segment
/// when nothing matches.
pub fn highlight_unit(unit: &str, target: &str) -> Vec<Segment> {
    let re = match RegexBuilder::new(&regex::escape(target))
        .case_insensitive(true)
        .build()
    {
        Ok(re) if !target.is_empty() => re,
        _ => return vec![Segment::Text(unit.to_string())],
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(unit) {
        if m.start() > last {
            segments.push(Segment::Text(unit[last..m.start()].to_string()));
        }
        segments.push(Segment::Highlight(m.as_str().to_string()));
        last = m.end();
    }
    if last < unit.len() {
        segments.push(Segment::Text(unit[last..].to_string()));
    }
    if segments.is_empty() {
        segments.push(Segment::Text(unit.to_string()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_word_phrase_found_in_answer() {
        let excerpt = "Quarterly revenue increased sharply during winter months";
        let answer = "Our data shows quarterly revenue increased sharply last year.";
        assert_eq!(
            highlight_target(excerpt, answer).as_deref(),
            Some("quarterly revenue increased")
        );
    }

    #[test]
    fn first_qualifying_phrase_in_excerpt_order_wins() {
        let excerpt = "alpha beta gamma delta epsilon";
        let answer = "beta gamma delta epsilon and alpha beta gamma";
        assert_eq!(
            highlight_target(excerpt, answer).as_deref(),
            Some("alpha beta gamma")
        );
    }

    #[test]
    fn short_tokens_are_dropped_before_windowing() {
        // "the", "was", "of" are skipped so the window spans them
        let excerpt = "budget was raised to fifty million dollars";
        let answer = "The budget raised fifty times.";
        assert_eq!(
            highlight_target(excerpt, answer).as_deref(),
            Some("budget raised fifty")
        );
    }

    #[test]
    fn falls_back_to_long_word() {
        let excerpt = "Engineers reviewed the prototype carefully";
        let answer = "The prototype passed every test.";
        assert_eq!(highlight_target(excerpt, answer).as_deref(), Some("prototype"));
    }

    #[test]
    fn fallback_skips_words_missing_from_answer() {
        let excerpt = "Engineers reviewed prototype";
        let answer = "A prototype exists.";
        assert_eq!(highlight_target(excerpt, answer).as_deref(), Some("prototype"));
    }

    #[test]
    fn fallback_requires_more_than_five_chars() {
        let excerpt = "cats sleep often";
        let answer = "cats are nice";
        assert_eq!(highlight_target(excerpt, answer), None);
    }

    #[test]
    fn short_word_excerpt_uses_long_word_fallback() {
        // Every word of "the cat sat on the mat" has at most 3 characters,
        // so only "quietly" survives the length filter.
        let excerpt = "The cat sat on the mat quietly";
        assert_eq!(
            highlight_target(excerpt, "Indeed the cat sat on the mat quietly."),
            Some("quietly".to_string())
        );
        assert_eq!(highlight_target(excerpt, "the cat sat on the mat"), None);
    }

    #[test]
    fn case_insensitive_match() {
        let excerpt = "TOTAL INCOME GREW steadily";
        let answer = "Total income grew by 4%.";
        assert_eq!(
            highlight_target(excerpt, answer).as_deref(),
            Some("total income grew")
        );
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        assert_eq!(highlight_target("", "anything at all"), None);
        assert_eq!(highlight_target("something longer here", ""), None);
    }

    #[test]
    fn highlight_unit_keeps_text_casing() {
        let segments = highlight_unit("Net income grew. Net Income fell.", "net income");
        assert_eq!(
            segments,
            vec![
                Segment::Highlight("Net income".into()),
                Segment::Text(" grew. ".into()),
                Segment::Highlight("Net Income".into()),
                Segment::Text(" fell.".into()),
            ]
        );
    }

    #[test]
    fn highlight_unit_escapes_regex_metacharacters() {
        let segments = highlight_unit("Costs (est.) rose.", "(est.)");
        assert_eq!(
            segments,
            vec![
                Segment::Text("Costs ".into()),
                Segment::Highlight("(est.)".into()),
                Segment::Text(" rose.".into()),
            ]
        );
    }

    #[test]
    fn highlight_unit_without_match_is_plain_text() {
        assert_eq!(
            highlight_unit("Nothing here.", "absent"),
            vec![Segment::Text("Nothing here.".into())]
        );
    }

    #[test]
    fn active_highlight_matches_by_key() {
        let cited = SourceReference {
            document_id: Some(4),
            filename: "plan.docx".into(),
            text: "strategic planning horizon extends".into(),
            chunk_index: Some(0),
            score: None,
        };
        let active =
            ActiveHighlight::for_source(&cited, "The strategic planning horizon is long.").unwrap();
        assert_eq!(active.target, "strategic planning horizon");

        let mut other_chunk = cited.clone();
        other_chunk.chunk_index = Some(9);
        assert!(active.applies_to(&[other_chunk]));

        let mut other_doc = cited;
        other_doc.document_id = Some(5);
        assert!(!active.applies_to(&[other_doc]));
    }
}
