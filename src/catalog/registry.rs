/// Table registry: the named table set queries run against
use crate::error::{Result, SandboxError};
use crate::types::{ColumnDef, SqlRow, Table, TableSchema, Value};
use ahash::AHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Column entry of a dataset file: `{"name": "id", "type": "INTEGER"}`
#[derive(Debug, Deserialize)]
struct DatasetColumn {
    name: String,
    #[serde(rename = "type", default)]
    declared_type: String,
}

/// Table entry of a dataset file
#[derive(Debug, Deserialize)]
struct DatasetTable {
    #[serde(default)]
    schema: Vec<DatasetColumn>,
    #[serde(default)]
    rows: Vec<serde_json::Value>,
}

/// Named table set, keyed by lower-cased table name
///
/// Built once before query time and only read afterwards, so a `&Catalog` can be
/// shared by any number of concurrent queries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: AHashMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table unless one with the same name already exists
    ///
    /// Idempotent: the first registration wins and later calls return it
    /// unchanged, so seeding the same dataset twice never duplicates rows.
    pub fn ensure_table(&mut self, table: Table) -> &Table {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            debug!(table = %name, "table already registered, keeping existing data");
        }
        self.tables.entry(name).or_insert(table)
    }

    /// Look up a table by name (case-insensitive)
    pub fn get(&self, table_name: &str) -> Option<&Table> {
        self.tables.get(&table_name.to_lowercase())
    }

    /// Look up a table, failing with `TableNotFound`
    pub fn resolve(&self, table_name: &str) -> Result<&Table> {
        self.get(table_name)
            .ok_or_else(|| SandboxError::TableNotFound(table_name.to_lowercase()))
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        self.get(table_name).is_some()
    }

    /// Table names in sorted order
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Load a dataset file (see [`Catalog::from_json_str`])
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    /// Parse a dataset document
    ///
    /// Shape: `{"<table>": {"schema": [{"name", "type"}], "rows": [{...}]}}`,
    /// optionally wrapped in `{"sampleData": {...}}`. Tables without a schema
    /// get one inferred from their first row.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;
        if let Some(inner) = document.get_mut("sampleData") {
            document = inner.take();
        }

        let tables: indexmap::IndexMap<String, DatasetTable> = serde_json::from_value(document)?;

        let mut catalog = Catalog::new();
        for (name, dataset) in tables {
            let table = Self::build_table(&name, dataset)?;
            debug!(table = %table.name(), rows = table.row_count(), "loaded table");
            catalog.ensure_table(table);
        }

        Ok(catalog)
    }

    fn build_table(name: &str, dataset: DatasetTable) -> Result<Table> {
        let schema = TableSchema::new(
            dataset
                .schema
                .iter()
                .map(|col| ColumnDef::new(&col.name, &col.declared_type))
                .collect(),
        );

        let mut rows = Vec::with_capacity(dataset.rows.len());
        for (idx, raw) in dataset.rows.into_iter().enumerate() {
            let serde_json::Value::Object(fields) = raw else {
                return Err(SandboxError::Dataset(format!(
                    "row {} of table '{}' is not an object",
                    idx, name
                )));
            };

            let mut row = SqlRow::with_capacity(fields.len());
            for (column, value) in fields {
                let value = Self::scalar(value).ok_or_else(|| {
                    SandboxError::Dataset(format!(
                        "column '{}' in row {} of table '{}' is not a scalar",
                        column, idx, name
                    ))
                })?;
                row.insert(column, value);
            }

            if !schema.columns.is_empty() {
                for key in row.keys() {
                    if schema.get_column(key).is_none() {
                        warn!(table = %name, column = %key, row = idx, "column not declared in schema");
                    }
                }
            }

            rows.push(row);
        }

        Ok(Table::new(name, schema, rows))
    }

    fn scalar(value: serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
            other => serde_json::from_value(other).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;
    use std::io::Write;

    const DATASET: &str = r#"{
        "Employees": {
            "schema": [
                {"name": "ID", "type": "INTEGER"},
                {"name": "Name", "type": "VARCHAR"},
                {"name": "Salary", "type": "DECIMAL"}
            ],
            "rows": [
                {"ID": 1, "Name": "John Doe", "Salary": 75000},
                {"ID": 2, "Name": "Jane Smith", "Salary": 65000.5}
            ]
        },
        "tags": {
            "rows": [{"tag": "a", "active": true}]
        }
    }"#;

    #[test]
    fn test_from_json_str() {
        let catalog = Catalog::from_json_str(DATASET).unwrap();
        assert_eq!(catalog.list_tables(), vec!["employees".to_string(), "tags".to_string()]);

        let employees = catalog.resolve("EMPLOYEES").unwrap();
        assert_eq!(employees.row_count(), 2);
        assert_eq!(employees.rows()[0].get("name"), Some(&Value::from("John Doe")));
        assert_eq!(employees.rows()[1].get("salary"), Some(&Value::Float(65000.5)));
        assert_eq!(
            employees.schema().get_column("salary").map(|c| c.col_type),
            Some(ColumnType::Float)
        );
    }

    #[test]
    fn test_schema_inferred_for_tables_without_one() {
        let catalog = Catalog::from_json_str(DATASET).unwrap();
        let tags = catalog.resolve("tags").unwrap();
        assert_eq!(tags.schema().column_names(), vec!["tag".to_string(), "active".to_string()]);
        assert_eq!(
            tags.schema().get_column("active").map(|c| c.col_type),
            Some(ColumnType::Boolean)
        );
    }

    #[test]
    fn test_sample_data_wrapper() {
        let json = r#"{"sampleData": {"t": {"rows": [{"a": 1}]}}}"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert!(catalog.table_exists("t"));
    }

    #[test]
    fn test_rejects_nested_values() {
        let json = r#"{"t": {"rows": [{"a": [1, 2]}]}}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, SandboxError::Dataset(_)));
    }

    #[test]
    fn test_resolve_missing_table() {
        let catalog = Catalog::new();
        let err = catalog.resolve("Users").unwrap_err();
        assert!(matches!(err, SandboxError::TableNotFound(ref t) if t == "users"));
    }

    #[test]
    fn test_ensure_table_is_idempotent() {
        let mut catalog = Catalog::new();
        let mut row = SqlRow::new();
        row.insert("a".to_string(), Value::Integer(1));

        catalog.ensure_table(Table::new("t", TableSchema::default(), vec![row.clone()]));
        let kept = catalog.ensure_table(Table::new("T", TableSchema::default(), vec![row.clone(), row]));

        assert_eq!(kept.row_count(), 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("dataset.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SandboxError::Io(_)));
    }
}
