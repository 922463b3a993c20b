/// Predicate evaluator - evaluates WHERE predicates against rows
///
/// A WHERE clause is a flat run of `<column> <op> <value>` conditions joined by
/// `AND`/`OR`. It is compiled once per query into a [`Predicate`] and then
/// evaluated per row.
use super::lexer::Lexer;
use super::token::{render, Token, TokenType};
use crate::config::PredicateMode;
use crate::error::{Result, SandboxError};
use crate::types::{loose_eq, to_number, SqlRow, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    fn from_token(token_type: &TokenType) -> Option<Self> {
        match token_type {
            TokenType::Eq => Some(CompareOp::Eq),
            TokenType::Ne => Some(CompareOp::Ne),
            TokenType::Lt => Some(CompareOp::Lt),
            TokenType::Gt => Some(CompareOp::Gt),
            TokenType::Le => Some(CompareOp::Le),
            TokenType::Ge => Some(CompareOp::Ge),
            _ => None,
        }
    }
}

/// `<column> <op> <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    pub literal: Value,
}

impl Condition {
    /// Parse one condition; `None` if the tokens do not have the expected shape
    fn parse(tokens: &[Token]) -> Option<Self> {
        let types: Vec<&TokenType> = tokens.iter().map(|t| &t.token_type).collect();

        // Column, optionally qualified (the qualifier is dropped)
        let (column, rest) = match types.as_slice() {
            [TokenType::Identifier(_), TokenType::Dot, TokenType::Identifier(col), rest @ ..] => {
                (col.to_lowercase(), rest)
            }
            [TokenType::Identifier(col), rest @ ..] => (col.to_lowercase(), rest),
            _ => return None,
        };

        let (op, value) = rest.split_first()?;
        let op = CompareOp::from_token(op)?;

        let literal = match value {
            [TokenType::Number(n)] => Value::Float(*n),
            [TokenType::Minus, TokenType::Number(n)] => Value::Float(-n),
            [TokenType::String(s)] => Value::Text(s.clone()),
            // A bare word (or keyword) is taken verbatim
            [other] if matches!(other, TokenType::Identifier(_)) || other.is_keyword() => {
                let lexeme = &tokens[tokens.len() - 1].lexeme;
                Value::Text(lexeme.clone())
            }
            _ => return None,
        };

        Some(Self {
            column,
            op,
            literal,
        })
    }

    pub fn evaluate(&self, row: &SqlRow) -> bool {
        let field = row.get(&self.column);
        match self.op {
            CompareOp::Eq => loose_eq(field, Some(&self.literal)),
            CompareOp::Ne => !loose_eq(field, Some(&self.literal)),
            // NaN on either side makes every ordering comparison false
            CompareOp::Lt => to_number(field) < to_number(Some(&self.literal)),
            CompareOp::Gt => to_number(field) > to_number(Some(&self.literal)),
            CompareOp::Le => to_number(field) <= to_number(Some(&self.literal)),
            CompareOp::Ge => to_number(field) >= to_number(Some(&self.literal)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Condition(Condition),
    /// Unparsable text; true for every row
    Malformed(String),
}

impl Term {
    fn evaluate(&self, row: &SqlRow) -> bool {
        match self {
            Term::Condition(condition) => condition.evaluate(row),
            Term::Malformed(_) => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Single,
    All,
    Any,
}

/// Compiled WHERE clause
///
/// Grouping: if any `AND` is present the clause is split on every `AND` and
/// `OR` and all parts must hold; otherwise with `OR` present at least one must
/// hold. `a = 1 OR b = 2 AND c = 3` therefore requires all three.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    combinator: Combinator,
    terms: Vec<Term>,
}

impl Predicate {
    /// Compile a WHERE token run
    ///
    /// In `Strict` mode a malformed condition fails with `MalformedPredicate`.
    pub fn parse(tokens: &[Token], mode: PredicateMode) -> Result<Self> {
        let tokens: Vec<&Token> = tokens.iter().filter(|t| !t.is_eof()).collect();

        let mut has_and = false;
        let mut has_or = false;
        let mut segments: Vec<Vec<Token>> = vec![Vec::new()];
        for token in tokens {
            match token.token_type {
                TokenType::And => has_and = true,
                TokenType::Or => has_or = true,
                _ => {
                    if let Some(segment) = segments.last_mut() {
                        segment.push(token.clone());
                    }
                    continue;
                }
            }
            segments.push(Vec::new());
        }

        let combinator = if has_and {
            Combinator::All
        } else if has_or {
            Combinator::Any
        } else {
            Combinator::Single
        };

        let mut terms = Vec::with_capacity(segments.len());
        for segment in segments {
            match Condition::parse(&segment) {
                Some(condition) => terms.push(Term::Condition(condition)),
                None => {
                    let text = render(&segment);
                    if mode.is_strict() {
                        return Err(SandboxError::MalformedPredicate(text));
                    }
                    terms.push(Term::Malformed(text));
                }
            }
        }

        Ok(Self { combinator, terms })
    }

    /// Compile predicate text (fail-open)
    pub fn from_text(text: &str) -> Self {
        let tokens = Lexer::new(text).tokenize();
        match Self::parse(&tokens, PredicateMode::FailOpen) {
            Ok(predicate) => predicate,
            // Fail-open parsing has no error path
            Err(_) => Self {
                combinator: Combinator::Single,
                terms: vec![Term::Malformed(text.to_string())],
            },
        }
    }

    pub fn evaluate(&self, row: &SqlRow) -> bool {
        match self.combinator {
            Combinator::All | Combinator::Single => self.terms.iter().all(|t| t.evaluate(row)),
            Combinator::Any => self.terms.iter().any(|t| t.evaluate(row)),
        }
    }

    /// Texts of the conditions that could not be parsed
    pub fn malformed_terms(&self) -> Vec<&str> {
        self.terms
            .iter()
            .filter_map(|t| match t {
                Term::Malformed(text) => Some(text.as_str()),
                Term::Condition(_) => None,
            })
            .collect()
    }
}

/// Evaluate predicate text against one row (fail-open)
pub fn evaluate(row: &SqlRow, predicate: &str) -> bool {
    Predicate::from_text(predicate).evaluate(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> SqlRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn bob() -> SqlRow {
        row(&[
            ("id", Value::Integer(3)),
            ("name", Value::from("Bob Johnson")),
            ("department", Value::from("Engineering")),
            ("salary", Value::Integer(80000)),
        ])
    }

    #[test]
    fn test_equality_is_loose() {
        let r = row(&[("code", Value::from("5"))]);
        assert!(evaluate(&r, "code = 5"));
        assert!(evaluate(&bob(), "id = '3'"));
        assert!(!evaluate(&bob(), "id != 3"));
        assert!(evaluate(&bob(), "id <> 4"));
    }

    #[test]
    fn test_string_and_bare_word_literals() {
        assert!(evaluate(&bob(), "department = 'Engineering'"));
        assert!(evaluate(&bob(), "department = Engineering"));
        assert!(!evaluate(&bob(), "department = 'engineering'"));
        assert!(evaluate(&bob(), "name = \"Bob Johnson\""));
    }

    #[test]
    fn test_ordering_comparisons() {
        assert!(evaluate(&bob(), "salary > 75000"));
        assert!(evaluate(&bob(), "salary >= 80000"));
        assert!(evaluate(&bob(), "salary <= 80000"));
        assert!(!evaluate(&bob(), "salary < 80000"));
        assert!(evaluate(&bob(), "id > -1"));
    }

    #[test]
    fn test_absent_column() {
        assert!(!evaluate(&bob(), "bonus > 0"));
        assert!(!evaluate(&bob(), "bonus < 0"));
        assert!(!evaluate(&bob(), "bonus = 0"));
        assert!(evaluate(&bob(), "bonus != 0"));
    }

    #[test]
    fn test_qualified_column() {
        assert!(evaluate(&bob(), "e.salary > 70000"));
    }

    #[test]
    fn test_and_or_grouping() {
        assert!(evaluate(&bob(), "department = 'Engineering' AND salary > 75000"));
        assert!(evaluate(&bob(), "department = 'Sales' OR salary > 75000"));
        assert!(!evaluate(&bob(), "department = 'Sales' OR salary > 90000"));
        // AND present: every part must hold, OR included
        assert!(!evaluate(&bob(), "department = 'Sales' OR salary > 75000 AND id = 3"));
    }

    #[test]
    fn test_keywords_inside_literals_do_not_split() {
        let r = row(&[("name", Value::from("Tom AND Jerry"))]);
        assert!(evaluate(&r, "name = 'Tom AND Jerry'"));
    }

    #[test]
    fn test_fail_open() {
        assert!(evaluate(&bob(), "name LIKE 'J%'"));
        assert!(evaluate(&bob(), "salary BETWEEN 1 AND 2"));

        let predicate = Predicate::from_text("name LIKE 'J%' AND id = 3");
        assert_eq!(predicate.malformed_terms(), vec!["name LIKE 'J%'"]);
        assert!(predicate.evaluate(&bob()));
    }

    #[test]
    fn test_strict_mode() {
        let tokens = Lexer::new("name LIKE 'J%'").tokenize();
        let err = Predicate::parse(&tokens, PredicateMode::Strict).unwrap_err();
        assert!(matches!(err, SandboxError::MalformedPredicate(ref t) if t == "name LIKE 'J%'"));

        let tokens = Lexer::new("salary >= 1").tokenize();
        assert!(Predicate::parse(&tokens, PredicateMode::Strict).is_ok());
    }
}
