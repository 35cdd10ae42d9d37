//! Sentence splitting and token helpers shared by the formatter and the
//! excerpt extractor.

use regex::Regex;
use std::sync::OnceLock;

fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary regex is valid"))
}

/// Split `text` into sentence-like units.
///
/// A boundary is `.`, `!` or `?` followed by whitespace; the punctuation and
/// the whitespace stay attached to the unit they end. Concatenating the
/// returned units reproduces `text` exactly.
///
/// ```rust
/// use doc_chat_core::text::split_sentences;
///
/// let units = split_sentences("Costs fell. Revenue rose!  Why?");
/// assert_eq!(units, vec!["Costs fell. ", "Revenue rose!  ", "Why?"]);
/// ```
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    for m in sentence_boundary().find_iter(text) {
        units.push(&text[start..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        units.push(&text[start..]);
    }
    units
}

/// Number of characters (not bytes) in `s`.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_units() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn no_terminal_punctuation_is_one_unit() {
        assert_eq!(split_sentences("just a phrase"), vec!["just a phrase"]);
    }

    #[test]
    fn trailing_delimiter_leaves_no_empty_unit() {
        assert_eq!(split_sentences("One. Two. "), vec!["One. ", "Two. "]);
    }

    #[test]
    fn punctuation_without_whitespace_does_not_split() {
        assert_eq!(split_sentences("Version 1.5 shipped."), vec!["Version 1.5 shipped."]);
    }

    #[test]
    fn newlines_count_as_whitespace() {
        assert_eq!(split_sentences("Done.\nNext"), vec!["Done.\n", "Next"]);
    }

    #[test]
    fn units_concatenate_to_input() {
        let text = "  Leading space. Mid! End?  tail";
        assert_eq!(split_sentences(text).concat(), text);
    }

    #[test]
    fn char_len_counts_chars() {
        assert_eq!(char_len("café"), 4);
    }
}
