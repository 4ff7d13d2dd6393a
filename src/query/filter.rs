//! Filter clauses: `field` or `field__lookup` keys, ANDed together.

use crate::config::Record;
use serde_json::Value;
use std::cmp::Ordering;

/// Separator between a field name and its lookup suffix.
pub const LOOKUP_SEP: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    IExact,
    Contains,
    IContains,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Lookup {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "exact" => Lookup::Exact,
            "iexact" => Lookup::IExact,
            "contains" => Lookup::Contains,
            "icontains" => Lookup::IContains,
            "startswith" => Lookup::StartsWith,
            "endswith" => Lookup::EndsWith,
            "gt" => Lookup::Gt,
            "gte" => Lookup::Gte,
            "lt" => Lookup::Lt,
            "lte" => Lookup::Lte,
            _ => return None,
        })
    }

    /// Text lookups compare against the raw string, not the field's typed value.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Lookup::IExact | Lookup::Contains | Lookup::IContains | Lookup::StartsWith | Lookup::EndsWith
        )
    }
}

/// Field segment of a filter key: everything before the first `__`.
pub fn field_of(key: &str) -> &str {
    key.split_once(LOOKUP_SEP).map(|(f, _)| f).unwrap_or(key)
}

/// Split a filter key into field and lookup. `None` when the suffix is not a known lookup.
pub fn split_key(key: &str) -> Option<(&str, Lookup)> {
    match key.split_once(LOOKUP_SEP) {
        None => Some((key, Lookup::Exact)),
        Some((field, op)) => Lookup::parse(op).map(|l| (field, l)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub lookup: Lookup,
    pub value: Value,
}

impl FilterClause {
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field).unwrap_or(&Value::Null);
        match self.lookup {
            Lookup::Exact => values_equal(actual, &self.value),
            Lookup::Gt => compare_values(actual, &self.value) == Ordering::Greater,
            Lookup::Gte => compare_values(actual, &self.value) != Ordering::Less,
            Lookup::Lt => compare_values(actual, &self.value) == Ordering::Less,
            Lookup::Lte => compare_values(actual, &self.value) != Ordering::Greater,
            Lookup::IExact | Lookup::Contains | Lookup::IContains | Lookup::StartsWith | Lookup::EndsWith => {
                let (Some(a), Some(b)) = (text_of(actual), text_of(&self.value)) else {
                    return false;
                };
                match self.lookup {
                    Lookup::IExact => a.to_lowercase() == b.to_lowercase(),
                    Lookup::Contains => a.contains(&b),
                    Lookup::IContains => a.to_lowercase().contains(&b.to_lowercase()),
                    Lookup::StartsWith => a.starts_with(&b),
                    _ => a.ends_with(&b),
                }
            }
        }
    }
}

/// Ordered conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub clauses: Vec<FilterClause>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    pub fn exact(field: impl Into<String>, value: Value) -> Self {
        FilterSpec {
            clauses: vec![FilterClause {
                field: field.into(),
                lookup: Lookup::Exact,
                value,
            }],
        }
    }
}

fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Ordering::Equal,
        _ => a == b,
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(i), Some(j)) => i.cmp(&j),
            _ => {
                let (fx, fy) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
                fx.partial_cmp(&fy).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("name"), Some(("name", Lookup::Exact)));
        assert_eq!(split_key("name__icontains"), Some(("name", Lookup::IContains)));
        assert_eq!(split_key("name__bogus"), None);
        assert_eq!(field_of("name__bogus"), "name");
    }

    #[test]
    fn test_conjunction() {
        let spec = FilterSpec {
            clauses: vec![
                FilterClause {
                    field: "id".into(),
                    lookup: Lookup::Gte,
                    value: json!(2),
                },
                FilterClause {
                    field: "name".into(),
                    lookup: Lookup::IContains,
                    value: json!("WEB"),
                },
            ],
        };
        assert!(spec.matches(&record(json!({"id": 2, "name": "webdev"}))));
        assert!(!spec.matches(&record(json!({"id": 1, "name": "webdev"}))));
        assert!(!spec.matches(&record(json!({"id": 3, "name": "art"}))));
    }

    #[test]
    fn test_exact_numbers_compare_by_value() {
        let spec = FilterSpec::exact("score", json!(1));
        assert!(spec.matches(&record(json!({"score": 1.0}))));
        assert!(!spec.matches(&record(json!({"score": "1"}))));
    }

    #[test]
    fn test_compare_values_orders_types() {
        assert_eq!(compare_values(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(1.5), &json!(1)), Ordering::Greater);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&json!(9), &json!("a")), Ordering::Less);
    }
}
