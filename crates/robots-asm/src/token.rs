//! Line splitting: comment stripping and whitespace tokenization.

/// Strip a `'`-to-end-of-line comment, if any.
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    match line.find('\'') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Split a line into whitespace-separated tokens.
#[must_use]
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
