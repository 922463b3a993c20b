//! Error types for the sqlsandbox query engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxError>;

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Only SELECT queries are allowed")]
    UnsupportedStatement,

    #[error("Operation '{0}' is not permitted")]
    ForbiddenOperation(String),

    #[error("{0} clause is required")]
    MissingClause(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid JOIN condition format: {0}. Use: table1.column = table2.column")]
    InvalidJoinCondition(String),

    #[error("Malformed predicate: {0}")]
    MalformedPredicate(String),

    // Unsupported clauses, stray tokens, unknown functions
    #[error("Syntax error: {0}")]
    Syntax(String),

    // Dataset loading errors (never produced by query execution)
    #[error("Invalid dataset: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reserved for broken engine invariants; no query path produces it today
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SandboxError {
    /// Short machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            SandboxError::UnsupportedStatement => "UnsupportedStatement",
            SandboxError::ForbiddenOperation(_) => "ForbiddenOperation",
            SandboxError::MissingClause(_) => "MissingClause",
            SandboxError::TableNotFound(_) => "TableNotFound",
            SandboxError::InvalidJoinCondition(_) => "InvalidJoinCondition",
            SandboxError::MalformedPredicate(_) => "MalformedPredicate",
            SandboxError::Syntax(_) => "Syntax",
            SandboxError::Dataset(_) => "Dataset",
            SandboxError::Io(_) => "Io",
            SandboxError::Json(_) => "Json",
            SandboxError::Internal(_) => "Internal",
        }
    }
}
