//! Text normalisation helpers for the scorer
//!
//! Everything here is pure string work: tokenisation, word and sentence
//! counting, and case-insensitive keyword matching. Scoring rules live in
//! the parent module; this file only answers questions about text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Word tokens: runs of letters/digits, apostrophes allowed inside
/// contractions ("don't" is one token).
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+(?:'[A-Za-z]+)*").unwrap());

/// Sentence terminators: a run of ./!/? followed by whitespace or end.
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(\s|$)").unwrap());

/// Whether a response is empty for scoring purposes.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Lowercased word tokens with punctuation stripped.
pub fn words(text: &str) -> Vec<String> {
    WORD_RE.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// Number of word tokens.
pub fn word_count(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// Number of distinct lowercased word tokens.
pub fn distinct_word_count(text: &str) -> usize {
    let mut seen = std::collections::HashSet::new();
    for word in words(text) {
        seen.insert(word);
    }
    seen.len()
}

/// Number of sentences in a response.
///
/// Counts terminator runs; trailing text without a terminator still counts
/// as a sentence, so "one. two" has two and "hello" has one.
pub fn sentence_count(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let terminated = SENTENCE_END_RE.find_iter(trimmed).count();

    // Anything left after the last terminator is an unterminated sentence.
    let tail_start = SENTENCE_END_RE
        .find_iter(trimmed)
        .last()
        .map(|m| m.end())
        .unwrap_or(0);
    let has_tail = word_count(&trimmed[tail_start..]) > 0;

    terminated + usize::from(has_tail)
}

/// Lowercase, collapse internal whitespace, trim.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring match of `keyword` in `text`.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    text.to_lowercase().contains(&keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_strip_punctuation_and_case() {
        assert_eq!(words("Hello, World!"), vec!["hello", "world"]);
        assert_eq!(words("Don't panic."), vec!["don't", "panic"]);
    }

    #[test]
    fn word_count_ignores_punctuation_runs() {
        assert_eq!(word_count("one two three"), 3);
        assert_eq!(word_count("one -- two ..."), 2);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn sentence_count_handles_terminators() {
        assert_eq!(sentence_count("One sentence."), 1);
        assert_eq!(sentence_count("One. Two."), 2);
        assert_eq!(sentence_count("No terminator at all"), 1);
        assert_eq!(sentence_count("First. And a tail"), 2);
        assert_eq!(sentence_count(""), 0);
    }

    #[test]
    fn sentence_count_treats_ellipsis_as_one_break() {
        assert_eq!(sentence_count("Wait... what?"), 2);
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Hello   World  "), "hello world");
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        assert!(contains_keyword("The Water Cycle drives climate", "water cycle"));
        assert!(contains_keyword("EVAPORATION matters", "evaporation"));
        assert!(!contains_keyword("condensation", "evaporation"));
        assert!(!contains_keyword("anything", "   "));
    }

    #[test]
    fn distinct_words_deduplicate_case_insensitively() {
        assert_eq!(distinct_word_count("the The THE cat"), 2);
    }
}
