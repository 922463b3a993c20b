/// Statement guard: only read-only SELECT statements get past this point
use crate::config::QueryConfig;
use crate::error::{Result, SandboxError};
use tracing::debug;

/// Collapse whitespace runs to a single space and trim
pub fn normalize(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate a statement and return its normalized text
///
/// The keyword check runs over the whole text, string literals included, so
/// `WHERE note = 'DELETE ME'` is rejected too.
pub fn check(statement: &str, config: &QueryConfig) -> Result<String> {
    let normalized = normalize(statement);
    let upper = normalized.to_uppercase();

    if !upper.starts_with("SELECT") {
        debug!(statement = %normalized, "rejected non-SELECT statement");
        return Err(SandboxError::UnsupportedStatement);
    }

    if let Some(keyword) = find_blocked_keyword(&upper, &config.blocked_keywords) {
        debug!(statement = %normalized, keyword = %keyword, "rejected blocked keyword");
        return Err(SandboxError::ForbiddenOperation(keyword.to_string()));
    }

    Ok(normalized)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// First keyword of `blocked` (in list order) that occurs as a whole word
fn find_blocked_keyword<'a>(upper: &str, blocked: &'a [String]) -> Option<&'a str> {
    let words: Vec<&str> = upper
        .split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .collect();

    blocked
        .iter()
        .map(String::as_str)
        .find(|keyword| words.contains(keyword))
}
