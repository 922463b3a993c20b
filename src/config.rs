//! Query engine configuration
//!
//! Controls the statement guard and how unparsable WHERE predicates are treated.

use serde::{Deserialize, Serialize};

/// Keywords rejected anywhere in a statement, string literals included.
pub const DEFAULT_BLOCKED_KEYWORDS: [&str; 7] = [
    "DROP", "DELETE", "UPDATE", "INSERT", "ALTER", "CREATE", "TRUNCATE",
];

/// How a WHERE sub-predicate that does not match `<column> <op> <value>` is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateMode {
    /// The sub-predicate evaluates to true for every record.
    ///
    /// This is the historical behavior: `WHERE name LIKE 'J%'` filters nothing.
    #[default]
    FailOpen,

    /// The query fails with `MalformedPredicate`.
    Strict,
}

impl PredicateMode {
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Query engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Whole-word keywords that make a statement fail with `ForbiddenOperation`.
    /// Checked in list order; the first hit is reported.
    pub blocked_keywords: Vec<String>,

    /// Treatment of malformed WHERE predicates
    pub predicate_mode: PredicateMode,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            blocked_keywords: DEFAULT_BLOCKED_KEYWORDS
                .iter()
                .map(|kw| kw.to_string())
                .collect(),
            predicate_mode: PredicateMode::default(),
        }
    }
}

impl QueryConfig {
    /// Default configuration with strict predicate parsing
    pub fn strict() -> Self {
        Self::default().with_predicate_mode(PredicateMode::Strict)
    }

    pub fn with_predicate_mode(mut self, mode: PredicateMode) -> Self {
        self.predicate_mode = mode;
        self
    }

    /// Replace the blocklist. Keywords are stored upper-cased.
    pub fn with_blocked_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked_keywords = keywords
            .into_iter()
            .map(|kw| kw.as_ref().trim().to_uppercase())
            .filter(|kw| !kw.is_empty())
            .collect();
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: QueryConfig = serde_json::from_str(json)?;
        // Normalize whatever casing the file used
        let keywords = config.blocked_keywords.clone();
        Ok(config.with_blocked_keywords(keywords))
    }
}
