use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::store::Row;

/// A single narrowing predicate on one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Filter {
    /// Column strictly equals the value.
    Eq { column: String, value: Value },
    /// Column does not strictly equal the value. Rows missing the column pass.
    Neq { column: String, value: Value },
    /// Column strictly equals one of the values.
    In { column: String, values: Vec<Value> },
}

impl Filter {
    /// Column the predicate reads.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Eq { column, .. } | Self::Neq { column, .. } | Self::In { column, .. } => column,
        }
    }

    /// Whether `row` passes the predicate.
    ///
    /// A missing column never equals anything, including `null`.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(self.column());
        match self {
            Self::Eq { value, .. } => cell.is_some_and(|cell| strict_eq(cell, value)),
            Self::Neq { value, .. } => !cell.is_some_and(|cell| strict_eq(cell, value)),
            Self::In { values, .. } => {
                cell.is_some_and(|cell| values.iter().any(|value| strict_eq(cell, value)))
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { column, value } => write!(f, "{column}=eq.{value}"),
            Self::Neq { column, value } => write!(f, "{column}=neq.{value}"),
            Self::In { column, values } => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{column}=in.({})", rendered.join(","))
            }
        }
    }
}

/// Equality without type coercion. Numbers compare by value, so `1` and
/// `1.0` are equal; every other kind compares structurally.
#[allow(clippy::float_cmp)]
fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            a == b || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, strict_eq};
    use crate::store::Row;
    use serde_json::{Value, json};

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn eq(column: &str, value: Value) -> Filter {
        Filter::Eq {
            column: column.to_string(),
            value,
        }
    }

    #[test]
    fn eq_does_not_coerce_types() {
        let r = row(json!({"position": 1, "is_archived": false}));
        assert!(eq("position", json!(1)).matches(&r));
        assert!(eq("position", json!(1.0)).matches(&r));
        assert!(!eq("position", json!("1")).matches(&r));
        assert!(!eq("is_archived", json!(0)).matches(&r));
        assert!(eq("is_archived", json!(false)).matches(&r));
    }

    #[test]
    fn missing_column_never_equals_null() {
        let r = row(json!({"due_date": null}));
        assert!(eq("due_date", Value::Null).matches(&r));
        assert!(!eq("completed_at", Value::Null).matches(&r));

        let neq = Filter::Neq {
            column: "completed_at".to_string(),
            value: Value::Null,
        };
        assert!(neq.matches(&r));
    }

    #[test]
    fn in_matches_any_member() {
        let r = row(json!({"role": "manager"}));
        let filter = Filter::In {
            column: "role".to_string(),
            values: vec![json!("owner"), json!("manager")],
        };
        assert!(filter.matches(&r));

        let filter = Filter::In {
            column: "role".to_string(),
            values: vec![json!("employee")],
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn display_uses_postgrest_style() {
        assert_eq!(eq("id", json!("x")).to_string(), "id=eq.\"x\"");
        let filter = Filter::In {
            column: "n".to_string(),
            values: vec![json!(1), json!(2)],
        };
        assert_eq!(filter.to_string(), "n=in.(1,2)");
    }

    #[test]
    fn strict_eq_on_nested_values_is_structural() {
        assert!(strict_eq(&json!({"a": [1, 2]}), &json!({"a": [1, 2]})));
        assert!(!strict_eq(&json!([1]), &json!([1, 2])));
    }
}
