//! Sample datasets shared by the unit tests

use super::Catalog;

/// employees(id, name, department, salary)
pub const EMPLOYEES: &str = r#"{
    "employees": {
        "schema": [
            {"name": "id", "type": "INTEGER"},
            {"name": "name", "type": "VARCHAR"},
            {"name": "department", "type": "VARCHAR"},
            {"name": "salary", "type": "DECIMAL"}
        ],
        "rows": [
            {"id": 1, "name": "John Doe", "department": "Engineering", "salary": 75000},
            {"id": 2, "name": "Jane Smith", "department": "Marketing", "salary": 65000},
            {"id": 3, "name": "Bob Johnson", "department": "Engineering", "salary": 80000},
            {"id": 4, "name": "Alice Williams", "department": "Sales", "salary": 60000},
            {"id": 5, "name": "Charlie Brown", "department": "Engineering", "salary": 70000}
        ]
    }
}"#;

/// employees(id, name, department_id, salary) + departments(id, name, location).
/// Alice points at a department that does not exist.
pub const EMPLOYEES_DEPARTMENTS: &str = r#"{
    "employees": {
        "schema": [
            {"name": "id", "type": "INTEGER"},
            {"name": "name", "type": "VARCHAR"},
            {"name": "department_id", "type": "INTEGER"},
            {"name": "salary", "type": "DECIMAL"}
        ],
        "rows": [
            {"id": 1, "name": "John Doe", "department_id": 1, "salary": 75000},
            {"id": 2, "name": "Jane Smith", "department_id": 2, "salary": 65000},
            {"id": 3, "name": "Bob Johnson", "department_id": 1, "salary": 80000},
            {"id": 4, "name": "Alice Williams", "department_id": 9, "salary": 60000}
        ]
    },
    "departments": {
        "schema": [
            {"name": "id", "type": "INTEGER"},
            {"name": "name", "type": "VARCHAR"},
            {"name": "location", "type": "VARCHAR"}
        ],
        "rows": [
            {"id": 1, "name": "Engineering", "location": "Building A"},
            {"id": 2, "name": "Marketing", "location": "Building B"},
            {"id": 3, "name": "Sales", "location": "Building C"}
        ]
    }
}"#;

pub fn employees() -> Catalog {
    Catalog::from_json_str(EMPLOYEES).unwrap()
}

pub fn employees_departments() -> Catalog {
    Catalog::from_json_str(EMPLOYEES_DEPARTMENTS).unwrap()
}
