/// GROUP BY and aggregate functions (COUNT, SUM, AVG, MAX, MIN)
use super::ast::{AggregateArg, AggregateCall, AggregateFunc};
use crate::types::{key_string, to_number, SqlRow, Value};
use ahash::AHashMap;
use tracing::trace;

/// Groups rows by one column and computes aggregate calls per group
pub struct GroupAggregator<'a> {
    group_by: Option<&'a str>,
    calls: Vec<AggregateCall>,
}

impl<'a> GroupAggregator<'a> {
    /// `calls` in select-list order; calls with the same output name are computed once
    pub fn new(group_by: Option<&'a str>, calls: Vec<AggregateCall>) -> Self {
        let mut unique: Vec<AggregateCall> = Vec::with_capacity(calls.len());
        for call in calls {
            if !unique.iter().any(|c| c.output_name() == call.output_name()) {
                unique.push(call);
            }
        }
        Self {
            group_by,
            calls: unique,
        }
    }

    /// Column names of the produced rows
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.group_by.iter().map(|g| g.to_string()).collect();
        for call in &self.calls {
            let name = call.output_name();
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
        columns
    }

    /// One row per group in first-seen order, or exactly one row without GROUP BY
    pub fn execute(&self, rows: &[SqlRow]) -> Vec<SqlRow> {
        let Some(group_field) = self.group_by else {
            let all: Vec<&SqlRow> = rows.iter().collect();
            return vec![self.aggregate_row(SqlRow::new(), &all)];
        };

        // Build groups: key string -> rows, remembering first-seen order
        let mut index: AHashMap<String, usize> = AHashMap::new();
        let mut groups: Vec<(String, Vec<&SqlRow>)> = Vec::new();

        for row in rows {
            let key = key_string(row.get(group_field));
            match index.get(&key) {
                Some(&slot) => groups[slot].1.push(row),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![row]));
                }
            }
        }

        trace!(groups = groups.len(), field = %group_field, "grouped rows");

        groups
            .into_iter()
            .map(|(key, members)| {
                let mut head = SqlRow::new();
                // The group value is reported as its key string
                head.insert(group_field.to_string(), Value::Text(key));
                self.aggregate_row(head, &members)
            })
            .collect()
    }

    fn aggregate_row(&self, mut row: SqlRow, members: &[&SqlRow]) -> SqlRow {
        for call in &self.calls {
            row.insert(call.output_name(), eval_aggregate(call, members));
        }
        row
    }
}

/// `Number(x) || 0`: NaN and absent values count as zero
fn numeric_or_zero(value: Option<&Value>) -> f64 {
    let n = to_number(value);
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

fn eval_aggregate(call: &AggregateCall, rows: &[&SqlRow]) -> Value {
    let column = match (&call.func, &call.arg) {
        (AggregateFunc::Count, _) => return Value::Integer(rows.len() as i64),
        (_, AggregateArg::Column(col)) => col.as_str(),
        // Only COUNT accepts '*'
        (_, AggregateArg::Star) => return Value::Null,
    };

    let values = rows.iter().map(|row| numeric_or_zero(row.get(column)));

    match call.func {
        AggregateFunc::Sum => Value::from_f64(values.sum()),
        AggregateFunc::Avg => {
            let total: f64 = values.sum();
            // Empty input gives NaN, reported as null
            Value::from_f64(total / rows.len() as f64)
        }
        AggregateFunc::Max => Value::from_f64(values.fold(f64::NEG_INFINITY, f64::max)),
        AggregateFunc::Min => Value::from_f64(values.fold(f64::INFINITY, f64::min)),
        AggregateFunc::Count => Value::Integer(rows.len() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(func: AggregateFunc, col: &str) -> AggregateCall {
        AggregateCall {
            func,
            arg: AggregateArg::Column(col.to_string()),
        }
    }

    fn count_star() -> AggregateCall {
        AggregateCall {
            func: AggregateFunc::Count,
            arg: AggregateArg::Star,
        }
    }

    fn rows() -> Vec<SqlRow> {
        [
            ("Engineering", Value::Integer(75000)),
            ("Marketing", Value::Integer(65000)),
            ("Engineering", Value::Integer(80000)),
            ("Sales", Value::from("n/a")),
            ("Engineering", Value::Float(70001.5)),
        ]
        .into_iter()
        .map(|(dept, salary)| {
            let mut row = SqlRow::new();
            row.insert("department".to_string(), Value::from(dept));
            row.insert("salary".to_string(), salary);
            row
        })
        .collect()
    }

    #[test]
    fn test_group_by_first_seen_order() {
        let agg = GroupAggregator::new(
            Some("department"),
            vec![count_star(), call(AggregateFunc::Avg, "salary")],
        );
        let out = agg.execute(&rows());

        let depts: Vec<&Value> = out.iter().map(|r| &r["department"]).collect();
        assert_eq!(
            depts,
            vec![
                &Value::from("Engineering"),
                &Value::from("Marketing"),
                &Value::from("Sales")
            ]
        );
        assert_eq!(out[0]["count_*"], Value::Integer(3));
        assert_eq!(out[0]["avg_salary"].as_f64(), Some(75000.5));
        // Non-numeric text counts as zero
        assert_eq!(out[2]["avg_salary"].as_f64(), Some(0.0));
    }

    #[test]
    fn test_numeric_group_keys_become_strings() {
        let mut data = Vec::new();
        for (id, dept) in [(1, 10), (2, 20), (3, 10)] {
            let mut row = SqlRow::new();
            row.insert("id".to_string(), Value::Integer(id));
            row.insert("dept".to_string(), Value::Integer(dept));
            data.push(row);
        }

        let out = GroupAggregator::new(Some("dept"), vec![call(AggregateFunc::Sum, "id")]).execute(&data);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["dept"], Value::from("10"));
        assert_eq!(out[0]["sum_id"], Value::Integer(4));
    }

    #[test]
    fn test_whole_set_aggregate() {
        let agg = GroupAggregator::new(
            None,
            vec![
                call(AggregateFunc::Max, "salary"),
                call(AggregateFunc::Min, "salary"),
                call(AggregateFunc::Sum, "salary"),
                call(AggregateFunc::Max, "salary"),
            ],
        );
        assert_eq!(
            agg.output_columns(),
            vec!["max_salary".to_string(), "min_salary".to_string(), "sum_salary".to_string()]
        );

        let out = agg.execute(&rows());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["max_salary"], Value::Integer(80000));
        assert_eq!(out[0]["min_salary"], Value::Integer(0));
        assert_eq!(out[0]["sum_salary"].as_f64(), Some(290001.5));
    }

    #[test]
    fn test_empty_input() {
        let agg = GroupAggregator::new(
            None,
            vec![
                count_star(),
                call(AggregateFunc::Sum, "salary"),
                call(AggregateFunc::Avg, "salary"),
                call(AggregateFunc::Max, "salary"),
            ],
        );
        let out = agg.execute(&[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["count_*"], Value::Integer(0));
        assert_eq!(out[0]["sum_salary"], Value::Integer(0));
        assert_eq!(out[0]["avg_salary"], Value::Null);
        assert_eq!(out[0]["max_salary"], Value::Null);

        let grouped = GroupAggregator::new(Some("department"), vec![count_star()]);
        assert!(grouped.execute(&[]).is_empty());
    }
}
