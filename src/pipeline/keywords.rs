use std::collections::HashSet;

const STRIP_CHARS: &[char] = &['.', ',', '!', '?', '(', ')'];

/// Cheap keyword list: distinct words longer than three characters, in
/// first-seen order
///
/// Length is measured on the raw token, before punctuation is stripped.
/// Text without such words gives an empty string.
pub fn extract_keywords(text: &str, limit: usize) -> String {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for token in text.split_whitespace() {
        if keywords.len() == limit {
            break;
        }
        if token.chars().count() <= 3 {
            continue;
        }
        let word = token.trim_matches(STRIP_CHARS).to_lowercase();
        if word.is_empty() {
            continue;
        }
        if seen.insert(word.clone()) {
            keywords.push(word);
        }
    }

    keywords.join(", ")
}
