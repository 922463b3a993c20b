/// Nested Loop Join implementation
///
/// Algorithm: for each left row, scan every right row and keep the pairs
/// whose join columns are strictly equal.
///
/// Time complexity: O(n * m)
/// Space complexity: O(matches)
use crate::types::{strict_eq, SqlRow};

/// Inner equi-join executor
pub struct NestedLoopJoin<'a> {
    left_col: &'a str,
    right_col: &'a str,
}

impl<'a> NestedLoopJoin<'a> {
    pub fn new(left_col: &'a str, right_col: &'a str) -> Self {
        Self {
            left_col,
            right_col,
        }
    }

    /// Join two row sets, preserving left-major order
    pub fn execute(&self, left: &[SqlRow], right: &[SqlRow]) -> Vec<SqlRow> {
        let mut results = Vec::new();

        for left_row in left {
            let left_value = left_row.get(self.left_col);
            for right_row in right {
                if strict_eq(left_value, right_row.get(self.right_col)) {
                    results.push(Self::merge_rows(left_row, right_row));
                }
            }
        }

        results
    }

    /// Copy of the left row overlaid with every right-row field (right wins)
    fn merge_rows(left: &SqlRow, right: &SqlRow) -> SqlRow {
        let mut merged = SqlRow::with_capacity(left.len() + right.len());

        for (col, val) in left {
            merged.insert(col.clone(), val.clone());
        }
        for (col, val) in right {
            merged.insert(col.clone(), val.clone());
        }

        merged
    }
}
