//! Multi-key sort over fetched records. A leading `-` marks descending order.

use crate::config::Record;
use crate::query::filter::compare_values;
use serde_json::Value;
use std::cmp::Ordering;

pub const DESCENDING_MARKER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(DESCENDING_MARKER) {
            Some(field) => SortKey {
                field: field.to_string(),
                descending: true,
            },
            None => SortKey {
                field: raw.to_string(),
                descending: false,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn from_values(values: &[String]) -> Self {
        SortSpec {
            keys: values.iter().map(|v| SortKey::parse(v)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for key in &self.keys {
            let x = a.get(&key.field).unwrap_or(&Value::Null);
            let y = b.get(&key.field).unwrap_or(&Value::Null);
            let ord = compare_values(x, y);
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable sort, keys applied left to right.
    pub fn apply(&self, records: &mut [Record]) {
        if self.is_empty() {
            return;
        }
        records.sort_by(|a, b| self.compare(a, b));
    }
}
