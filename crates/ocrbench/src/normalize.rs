//! Text canonicalization for exact-match scoring.

/// Canonicalize `text` for comparison.
///
/// Trims the ends, lowercases, turns newlines into spaces and then drops every
/// remaining whitespace character. Two strings are equivalent for scoring iff
/// their normalized forms are equal.
///
/// ```rust
/// use ocrbench::normalize::normalize;
///
/// assert_eq!(normalize(" Hello\nWorld "), "helloworld");
/// ```
pub fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace('\n', " ")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Whether `answer` and `prediction` match once both are normalized.
pub fn is_match(answer: &str, prediction: &str) -> bool {
    normalize(&answer.to_lowercase()) == normalize(&prediction.to_lowercase())
}
