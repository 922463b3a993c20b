/// Table metadata and schema definitions
use serde::{Deserialize, Serialize};

use super::{SqlRow, Value};

/// Column data type, derived from the declared SQL type name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Date,
    Text,
}

impl ColumnType {
    /// Map a declared SQL type (`INTEGER`, `VARCHAR(50)`, `DECIMAL(10,2)` ...)
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_uppercase();
        if upper.contains("INT") {
            ColumnType::Integer
        } else if ["DECIMAL", "FLOAT", "DOUBLE", "REAL", "NUMERIC"]
            .iter()
            .any(|t| upper.contains(t))
        {
            ColumnType::Float
        } else if upper.contains("BOOL") {
            ColumnType::Boolean
        } else if upper.contains("DATE") || upper.contains("TIME") {
            ColumnType::Date
        } else {
            ColumnType::Text
        }
    }

    /// Type of a sample value, for schema inference
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
            Value::Bool(_) => ColumnType::Boolean,
            Value::Null | Value::Text(_) => ColumnType::Text,
        }
    }

    fn declared_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Text => "VARCHAR",
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name (lower-cased)
    pub name: String,
    /// Type name as written in the dataset
    pub declared_type: String,
    pub col_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: &str, declared_type: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            declared_type: declared_type.to_string(),
            col_type: ColumnType::from_declared(declared_type),
        }
    }

    fn inferred(name: &str, sample: &Value) -> Self {
        let col_type = ColumnType::infer(sample);
        Self {
            name: name.to_lowercase(),
            declared_type: col_type.declared_name().to_string(),
            col_type,
        }
    }
}

/// Ordered table schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Infer a schema from the first record
    pub fn infer_from(row: Option<&SqlRow>) -> Self {
        let columns = row
            .map(|row| {
                row.iter()
                    .map(|(name, value)| ColumnDef::inferred(name, value))
                    .collect()
            })
            .unwrap_or_default();
        Self { columns }
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        let name = name.to_lowercase();
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// A named in-memory table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: TableSchema,
    rows: Vec<SqlRow>,
}

impl Table {
    /// Create a table. The table name and every column name are lower-cased here,
    /// so the rest of the engine only ever sees lower-case names.
    pub fn new(name: &str, schema: TableSchema, rows: Vec<SqlRow>) -> Self {
        let schema = TableSchema::new(
            schema
                .columns
                .into_iter()
                .map(|mut col| {
                    col.name = col.name.to_lowercase();
                    col
                })
                .collect(),
        );

        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(key, value)| (key.to_lowercase(), value))
                    .collect::<SqlRow>()
            })
            .collect::<Vec<_>>();

        let schema = if schema.columns.is_empty() {
            TableSchema::infer_from(rows.first())
        } else {
            schema
        };

        Self {
            name: name.to_lowercase(),
            schema,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[SqlRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
