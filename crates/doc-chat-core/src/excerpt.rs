//! Relevant-excerpt extraction for the source detail view.
//!
//! A cited excerpt can be long; the detail view first shows only the
//! sentences that share keywords with the question that produced the answer,
//! each padded with the sentence that follows it.

use crate::models::SourceReference;
use crate::text::{char_len, split_sentences};

const STOP_WORDS: &[&str] = &[
    "what", "did", "he", "she", "they", "do", "at", "the", "a", "an", "is", "are", "was", "were",
    "where", "when", "why", "how", "who",
];

/// Sentences kept when no sentence matches any keyword.
const FALLBACK_SENTENCES: usize = 3;

/// Keywords of `question`: lower-cased whitespace tokens longer than two
/// characters that are not stop words.
pub fn keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|w| char_len(w) > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// A sentence of the excerpt with its keyword score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSentence {
    /// Position of the sentence in the excerpt.
    pub index: usize,
    pub text: String,
    pub score: usize,
}

/// Sentences with at least one keyword hit, best first. Ties keep excerpt order.
pub fn rank_sentences(excerpt: &str, question: &str) -> Vec<ScoredSentence> {
    let keywords = keywords(question);
    let mut ranked: Vec<ScoredSentence> = split_sentences(excerpt)
        .into_iter()
        .enumerate()
        .map(|(index, sentence)| {
            let lower = sentence.to_lowercase();
            let score = keywords
                .iter()
                .filter(|k| lower.contains(k.as_str()))
                .count();
            ScoredSentence {
                index,
                text: sentence.to_string(),
                score,
            }
        })
        .filter(|s| s.score > 0)
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// The part of `excerpt` worth showing for `question`.
///
/// Relevant sentences appear in excerpt order, each followed by its
/// successor unless that successor is relevant itself. Without any relevant
/// sentence the first three sentences are used. An empty question, or an
/// assembly that comes out empty, yields the full excerpt.
pub fn relevant_excerpt(excerpt: &str, question: &str) -> String {
    if question.trim().is_empty() {
        return excerpt.to_string();
    }

    let sentences = split_sentences(excerpt);
    let ranked = rank_sentences(excerpt, question);

    let assembled = if ranked.is_empty() {
        join_trimmed(sentences.iter().take(FALLBACK_SENTENCES).copied())
    } else {
        let mut relevant = vec![false; sentences.len()];
        for s in &ranked {
            relevant[s.index] = true;
        }
        let mut picked = Vec::new();
        for (idx, sentence) in sentences.iter().enumerate() {
            if !relevant[idx] {
                continue;
            }
            picked.push(*sentence);
            if let Some(next) = sentences.get(idx + 1) {
                if !relevant[idx + 1] {
                    picked.push(*next);
                }
            }
        }
        join_trimmed(picked.into_iter())
    };

    if assembled.is_empty() {
        excerpt.to_string()
    } else {
        assembled
    }
}

fn join_trimmed<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// State of the source detail view: the cited source, its relevant subset,
/// and whether the full excerpt is being shown.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcerptView {
    pub source: SourceReference,
    pub question: String,
    relevant: String,
    show_full: bool,
}

impl ExcerptView {
    pub fn new(source: SourceReference, question: &str) -> Self {
        let relevant = relevant_excerpt(&source.text, question);
        Self {
            source,
            question: question.to_string(),
            relevant,
            show_full: false,
        }
    }

    pub fn relevant_text(&self) -> &str {
        &self.relevant
    }

    pub fn full_text(&self) -> &str {
        &self.source.text
    }

    /// The text currently on display.
    pub fn display_text(&self) -> &str {
        if self.show_full {
            self.full_text()
        } else {
            self.relevant_text()
        }
    }

    pub fn is_showing_full(&self) -> bool {
        self.show_full
    }

    /// The toggle is offered only when the relevant subset is strictly shorter.
    pub fn can_toggle(&self) -> bool {
        !self.relevant.is_empty() && char_len(&self.relevant) < char_len(&self.source.text)
    }

    /// Switch between relevant and full text. Returns false when no toggle is offered.
    pub fn toggle(&mut self) -> bool {
        if !self.can_toggle() {
            return false;
        }
        self.show_full = !self.show_full;
        true
    }

    pub fn heading(&self) -> &'static str {
        if self.show_full {
            "Full Excerpt"
        } else {
            "Relevant Excerpt"
        }
    }

    /// Label for the toggle action, if one is offered.
    pub fn toggle_label(&self) -> Option<&'static str> {
        if !self.can_toggle() {
            return None;
        }
        Some(if self.show_full {
            "Show only relevant"
        } else {
            "Show full excerpt"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: &str = "The committee met in March. The budget increase to 4 million was approved. \
        Staffing levels stay flat. Weather was mild all quarter. Parking rules changed.";

    fn source(text: &str) -> SourceReference {
        SourceReference {
            document_id: Some(1),
            filename: "minutes.docx".into(),
            text: text.into(),
            chunk_index: Some(0),
            score: Some(0.8),
        }
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        assert_eq!(
            keywords("What did the budget increase to?"),
            vec!["budget", "increase", "to?"]
        );
        assert_eq!(keywords("Who is he"), Vec::<String>::new());
    }

    #[test]
    fn budget_sentence_is_included_with_context() {
        let relevant = relevant_excerpt(BUDGET, "What did the budget increase to?");
        assert_eq!(
            relevant,
            "The budget increase to 4 million was approved. Staffing levels stay flat."
        );
        assert!(!relevant.contains("Weather"));
        assert!(!relevant.contains("committee"));
    }

    #[test]
    fn adjacent_relevant_sentences_are_not_duplicated() {
        let text = "Budget rose. Budget fell. Nothing else. Last one.";
        assert_eq!(
            relevant_excerpt(text, "budget"),
            "Budget rose. Budget fell. Nothing else."
        );
    }

    #[test]
    fn no_match_falls_back_to_first_three_sentences() {
        assert_eq!(
            relevant_excerpt(BUDGET, "zebra migration"),
            "The committee met in March. The budget increase to 4 million was approved. Staffing levels stay flat."
        );
    }

    #[test]
    fn empty_question_shows_everything() {
        assert_eq!(relevant_excerpt(BUDGET, "  "), BUDGET);
    }

    #[test]
    fn ranking_orders_by_score() {
        let text = "Revenue only. Revenue and margin together. Nothing.";
        let ranked = rank_sentences(text, "revenue margin");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].score, 2);
        assert_eq!(ranked[1].index, 0);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let ranked = rank_sentences("REVENUE CLIMBED.", "revenue");
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn view_toggles_when_subset_is_shorter() {
        let mut view = ExcerptView::new(source(BUDGET), "What did the budget increase to?");
        assert!(view.can_toggle());
        assert_eq!(view.heading(), "Relevant Excerpt");
        assert_eq!(view.toggle_label(), Some("Show full excerpt"));
        assert!(view.display_text().starts_with("The budget increase"));

        assert!(view.toggle());
        assert!(view.is_showing_full());
        assert_eq!(view.display_text(), BUDGET);
        assert_eq!(view.heading(), "Full Excerpt");
        assert_eq!(view.toggle_label(), Some("Show only relevant"));
    }

    #[test]
    fn view_without_shorter_subset_has_no_toggle() {
        let mut view = ExcerptView::new(source("Budget approved."), "budget");
        assert!(!view.can_toggle());
        assert_eq!(view.toggle_label(), None);
        assert!(!view.toggle());
        assert_eq!(view.display_text(), "Budget approved.");
    }

    #[test]
    fn empty_excerpt_has_no_toggle() {
        let view = ExcerptView::new(source(""), "anything relevant");
        assert!(!view.can_toggle());
        assert_eq!(view.display_text(), "");
    }
}
