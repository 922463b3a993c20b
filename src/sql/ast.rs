/// Clause set extracted from a SELECT statement
use super::token::Token;

/// Extracted clauses of a `SELECT` statement
#[derive(Debug, Clone)]
pub struct ClauseSet {
    pub columns: Vec<SelectItem>,
    pub from: TableRef,
    pub join: Option<JoinClause>,
    /// Raw WHERE tokens; parsed into a predicate by the evaluator
    pub where_tokens: Option<Vec<Token>>,
    pub group_by: Option<String>,
    pub order_by: Option<OrderBy>,
}

impl ClauseSet {
    /// True for a lone `*`
    pub fn is_select_star(&self) -> bool {
        matches!(self.columns.as_slice(), [SelectItem::Star])
    }

    pub fn has_aggregates(&self) -> bool {
        self.columns
            .iter()
            .any(|c| matches!(c, SelectItem::Aggregate { .. }))
    }

    /// Aggregate calls in select-list order
    pub fn aggregates(&self) -> Vec<AggregateCall> {
        self.columns
            .iter()
            .filter_map(|c| match c {
                SelectItem::Aggregate { call, .. } => Some(call.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Table reference: table_name [AS alias]
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// Whether `qualifier` names this table, by alias or by table name
    pub fn answers_to(&self, qualifier: &str) -> bool {
        self.name == qualifier || self.alias.as_deref() == Some(qualifier)
    }
}

/// `[INNER] JOIN right ON lq.lcol = rq.rcol`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub right: TableRef,
    pub left_qualifier: String,
    pub left_column: String,
    pub right_qualifier: String,
    pub right_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Star,
    /// `[qualifier.]name [AS alias]`. The alias is recognized but never applied.
    Column {
        qualifier: Option<String>,
        name: String,
        alias: Option<String>,
    },
    Aggregate {
        call: AggregateCall,
        alias: Option<String>,
    },
}

impl SelectItem {
    /// Source column this item projects, if any
    pub fn source_column(&self) -> Option<&str> {
        match self {
            SelectItem::Column { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregateFunc {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "count" => Some(AggregateFunc::Count),
            "sum" => Some(AggregateFunc::Sum),
            "avg" => Some(AggregateFunc::Avg),
            "max" => Some(AggregateFunc::Max),
            "min" => Some(AggregateFunc::Min),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "count",
            AggregateFunc::Sum => "sum",
            AggregateFunc::Avg => "avg",
            AggregateFunc::Max => "max",
            AggregateFunc::Min => "min",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateArg {
    Star,
    Column(String),
}

/// Aggregate function call, e.g. `AVG(salary)`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    pub func: AggregateFunc,
    pub arg: AggregateArg,
}

impl AggregateCall {
    /// Output column name: `<func>_<column>`, `count_*` for `COUNT(*)`
    pub fn output_name(&self) -> String {
        match &self.arg {
            AggregateArg::Star => format!("{}_*", self.func.name()),
            AggregateArg::Column(col) => format!("{}_{}", self.func.name(), col),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}
