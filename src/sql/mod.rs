/// sqlsandbox SQL engine
///
/// Runs a read-only subset of SELECT against in-memory tables.
///
/// Architecture:
/// - Guard: rejects anything but SELECT, and blocked keywords
/// - Lexer: Tokenizes SQL strings
/// - Parser: Extracts the clause set from tokens
/// - Evaluator: Compiles and evaluates WHERE predicates
/// - Join / Aggregate: relational operators
/// - Executor: Runs the pipeline and shapes the outcome
pub mod aggregate;
pub mod ast;
pub mod evaluator;
pub mod executor;
pub mod guard;
pub mod join;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::ClauseSet;
pub use evaluator::{evaluate, Predicate};
pub use executor::{QueryExecutor, QueryOutcome, QueryResult};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenType};

use crate::catalog::Catalog;

/// Parse and execute a statement with the default configuration
pub fn execute(statement: &str, catalog: &Catalog) -> QueryOutcome {
    QueryExecutor::default().execute(statement, catalog)
}
