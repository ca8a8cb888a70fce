use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

/// Tokens with this many characters or fewer never become keywords.
pub const MIN_KEYWORD_CHARS: usize = 3;

pub const STOP_WORDS: &[&str] = &[
	"the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
	"are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
	"would", "could", "should",
];

static WORD_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b\w+\b").ok());

pub fn is_stop_word(token: &str) -> bool {
	STOP_WORDS.contains(&token)
}

/// Extracts the deduplicated keyword set of `text`.
///
/// The text is lowercased and split on word boundaries. Tokens of at most
/// [`MIN_KEYWORD_CHARS`] characters and stop words are dropped. The result is ordered so that
/// persisted corpora serialize identically for identical input.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
	let Some(pattern) = WORD_PATTERN.as_ref() else { return BTreeSet::new() };
	let lowered = text.to_lowercase();
	let mut out = BTreeSet::new();

	for word in pattern.find_iter(&lowered) {
		let token = word.as_str();

		if token.chars().count() <= MIN_KEYWORD_CHARS || is_stop_word(token) {
			continue;
		}

		out.insert(token.to_string());
	}

	out
}
