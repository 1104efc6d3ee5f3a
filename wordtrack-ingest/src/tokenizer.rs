//! Clipboard text tokenizer
//!
//! Splits copied text into candidate vocabulary words. Pure and synchronous:
//! it never touches the store or the network.

use std::collections::HashSet;

/// Minimum token length kept (in characters)
pub const MIN_TOKEN_LEN: usize = 2;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '\''
}

/// Extract distinct candidate words from `text`, in first-occurrence order
///
/// - Splits on every run of characters that is not an ASCII letter or `'`
/// - Drops tokens shorter than [`MIN_TOKEN_LEN`]
/// - Treats `'` as a word character, so `fox's`, `'tis` and even `''` survive
/// - Removes exact duplicates only; case is preserved and folded later
///   when the canonical key is formed
///
/// ```
/// use wordtrack_ingest::tokenizer::tokenize;
///
/// assert_eq!(
///     tokenize("The quick, quick fox's den!"),
///     vec!["The", "quick", "fox's", "den"],
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    text.split(|c: char| !is_word_char(c))
        .map(str::trim)
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// Canonical store key for a token
pub fn canonical_key(token: &str) -> String {
    token.to_ascii_lowercase()
}
