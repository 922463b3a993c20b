/// Query executor - runs SELECT statements against an in-memory catalog
use super::aggregate::GroupAggregator;
use super::ast::*;
use super::evaluator::Predicate;
use super::guard;
use super::join::NestedLoopJoin;
use super::lexer::Lexer;
use super::parser::Parser;
use crate::catalog::Catalog;
use crate::config::QueryConfig;
use crate::error::{Result, SandboxError};
use crate::types::{compare_for_sort, SqlRow, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Query result
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Keys of the first row, or the projected names when there are no rows
    pub columns: Vec<String>,
    pub rows: Vec<SqlRow>,
}

impl QueryResult {
    fn new(rows: Vec<SqlRow>, fallback_columns: Vec<String>) -> Self {
        let columns = match rows.first() {
            Some(first) => first.keys().cloned().collect(),
            None => fallback_columns,
        };
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the column sequence equals `expected` (case-insensitive)
    pub fn has_columns(&self, expected: &[&str]) -> bool {
        self.columns.len() == expected.len()
            && self
                .columns
                .iter()
                .zip(expected)
                .all(|(actual, want)| actual.eq_ignore_ascii_case(want))
    }
}

/// Serializable outcome of a query, success or failure
///
/// ```text
/// {"success": true, "columns": [...], "rows": [...], "rowCount": n}
/// {"success": false, "error": "...", "columns": [], "rows": [], "rowCount": 0}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<SqlRow>,
    pub row_count: usize,
}

impl QueryOutcome {
    pub fn failure(err: &SandboxError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl From<QueryResult> for QueryOutcome {
    fn from(result: QueryResult) -> Self {
        let row_count = result.row_count();
        Self {
            success: true,
            error: None,
            columns: result.columns,
            rows: result.rows,
            row_count,
        }
    }
}

/// SELECT executor
///
/// Stateless apart from its configuration; one executor can serve any number of
/// queries, concurrently if needed.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    config: QueryConfig,
}

impl QueryExecutor {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Execute a statement, folding any failure into the outcome
    pub fn execute(&self, statement: &str, catalog: &Catalog) -> QueryOutcome {
        match self.try_execute(statement, catalog) {
            Ok(result) => {
                trace!(rows = result.row_count(), "query done");
                QueryOutcome::from(result)
            }
            Err(err) => {
                debug!(kind = err.kind(), error = %err, "query failed");
                QueryOutcome::failure(&err)
            }
        }
    }

    /// Execute a statement
    pub fn try_execute(&self, statement: &str, catalog: &Catalog) -> Result<QueryResult> {
        trace!("guarding");
        let normalized = guard::check(statement, &self.config)?;

        trace!(statement = %normalized, "extracting clauses");
        // Lex the raw text: normalizing joins lines, which would let `--` comments run on
        let tokens = Lexer::new(statement).tokenize();
        let clauses = Parser::new(tokens).parse()?;

        let predicate = match &clauses.where_tokens {
            Some(tokens) => {
                let predicate = Predicate::parse(tokens, self.config.predicate_mode)?;
                let malformed = predicate.malformed_terms();
                if !malformed.is_empty() {
                    debug!(terms = ?malformed, "ignoring unparsable WHERE conditions");
                }
                Some(predicate)
            }
            None => None,
        };

        match &clauses.join {
            Some(join) => self.execute_join(&clauses, join, predicate.as_ref(), catalog),
            None => self.execute_plain(&clauses, predicate.as_ref(), catalog),
        }
    }

    /// filter -> aggregate | (sort -> project)
    fn execute_plain(
        &self,
        clauses: &ClauseSet,
        predicate: Option<&Predicate>,
        catalog: &Catalog,
    ) -> Result<QueryResult> {
        let table = catalog.resolve(&clauses.from.name)?;
        trace!(table = %table.name(), rows = table.row_count(), "plain path");

        let rows = Self::apply_where(table.rows(), predicate);

        if clauses.group_by.is_some() || clauses.has_aggregates() {
            // ORDER BY does not apply to aggregated output
            let aggregator = GroupAggregator::new(clauses.group_by.as_deref(), clauses.aggregates());
            trace!(input = rows.len(), "aggregating");
            let grouped = aggregator.execute(&rows);
            return Ok(QueryResult::new(grouped, aggregator.output_columns()));
        }

        let rows = Self::apply_order_by(rows, clauses.order_by.as_ref());
        let rows = Self::project_columns(rows, clauses);

        let fallback = if clauses.is_select_star() {
            table.schema().column_names()
        } else {
            Self::projected_names(clauses)
        };
        Ok(QueryResult::new(rows, fallback))
    }

    /// join -> filter -> sort -> project. Aggregates and GROUP BY are not evaluated here.
    fn execute_join(
        &self,
        clauses: &ClauseSet,
        join: &JoinClause,
        predicate: Option<&Predicate>,
        catalog: &Catalog,
    ) -> Result<QueryResult> {
        let left = catalog.resolve(&clauses.from.name)?;
        let right = catalog.resolve(&join.right.name)?;

        let (left_col, right_col) = Self::join_columns(&clauses.from, join);
        trace!(
            left = %left.name(),
            right = %right.name(),
            left_col = %left_col,
            right_col = %right_col,
            "join path"
        );

        let joined = NestedLoopJoin::new(left_col, right_col).execute(left.rows(), right.rows());
        trace!(rows = joined.len(), "joined");

        let rows = Self::apply_where(&joined, predicate);
        let rows = Self::apply_order_by(rows, clauses.order_by.as_ref());
        let rows = Self::project_columns(rows, clauses);

        let fallback = if clauses.is_select_star() {
            Self::joined_columns(left, right)
        } else {
            Self::projected_names(clauses)
        };
        Ok(QueryResult::new(rows, fallback))
    }

    /// Join columns as (left table column, right table column)
    ///
    /// Taken positionally unless the qualifiers name the tables in reverse order.
    fn join_columns<'a>(from: &TableRef, join: &'a JoinClause) -> (&'a str, &'a str) {
        let reversed = !from.answers_to(&join.left_qualifier)
            && join.right.answers_to(&join.left_qualifier)
            && from.answers_to(&join.right_qualifier);
        if reversed {
            (join.right_column.as_str(), join.left_column.as_str())
        } else {
            (join.left_column.as_str(), join.right_column.as_str())
        }
    }

    fn joined_columns(left: &Table, right: &Table) -> Vec<String> {
        let mut columns = left.schema().column_names();
        for name in right.schema().column_names() {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
        columns
    }

    fn apply_where(rows: &[SqlRow], predicate: Option<&Predicate>) -> Vec<SqlRow> {
        let filtered: Vec<SqlRow> = match predicate {
            Some(predicate) => rows
                .iter()
                .filter(|row| predicate.evaluate(row))
                .cloned()
                .collect(),
            None => rows.to_vec(),
        };
        trace!(input = rows.len(), output = filtered.len(), "filtered");
        filtered
    }

    fn apply_order_by(mut rows: Vec<SqlRow>, order_by: Option<&OrderBy>) -> Vec<SqlRow> {
        if let Some(order) = order_by {
            // sort_by is stable
            rows.sort_by(|a, b| {
                compare_for_sort(a.get(&order.column), b.get(&order.column), order.descending)
            });
        }
        rows
    }

    /// Source column names in select-list order, without duplicates
    fn projected_names(clauses: &ClauseSet) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in clauses.columns.iter().filter_map(SelectItem::source_column) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Keep the selected source columns that exist in each row; aliases are not applied
    fn project_columns(rows: Vec<SqlRow>, clauses: &ClauseSet) -> Vec<SqlRow> {
        if clauses.is_select_star() {
            return rows;
        }

        let names = Self::projected_names(clauses);
        rows.into_iter()
            .map(|row| {
                let mut projected = SqlRow::with_capacity(names.len());
                for name in &names {
                    if let Some(value) = row.get(name) {
                        projected.insert(name.clone(), value.clone());
                    }
                }
                projected
            })
            .collect()
    }
}
