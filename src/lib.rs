//! sqlsandbox query engine
//!
//! An in-memory engine for a safe subset of SQL `SELECT`, meant for practice
//! environments where user-written queries run against sample tables.
//!
//! ## Features
//! - Projection, flat `AND`/`OR` filtering and `ORDER BY`
//! - One two-table equality `JOIN`
//! - `GROUP BY` with `COUNT`, `SUM`, `AVG`, `MAX`, `MIN`
//! - Mutating statements are rejected before parsing
//!
//! ## Example
//! ```
//! use sqlsandbox::Catalog;
//!
//! let catalog = Catalog::from_json_str(
//!     r#"{"employees": {"rows": [{"id": 1, "name": "Ann", "salary": 50000}]}}"#,
//! )?;
//! let outcome = sqlsandbox::execute("SELECT name FROM employees WHERE salary > 40000", &catalog);
//! assert!(outcome.success);
//! assert_eq!(outcome.row_count, 1);
//! # Ok::<(), sqlsandbox::SandboxError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod sql;
pub mod types;

mod error;

pub use catalog::Catalog;
pub use config::{PredicateMode, QueryConfig};
pub use error::{Result, SandboxError};
pub use sql::{execute, QueryExecutor, QueryOutcome, QueryResult};
pub use types::{SqlRow, Table, TableSchema, Value};
