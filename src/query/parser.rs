//! Compact query language: `field:value,field2:value2` pair lists and `field,-field2` value lists.

use serde_json::{Map, Value};
use thiserror::Error;

/// A request parameter as it arrived: a plain scalar, a string that may carry a
/// compact encoding, or an already structured map or list.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Scalar(Value),
    Encoded(String),
    Map(Map<String, Value>),
    List(Vec<Value>),
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => RawValue::Encoded(s),
            Value::Object(m) => RawValue::Map(m),
            Value::Array(a) => RawValue::List(a),
            other => RawValue::Scalar(other),
        }
    }
}

impl RawValue {
    /// Absent for the purpose of required-parameter checks.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Scalar(v) => v.is_null(),
            RawValue::Encoded(s) => s.trim().is_empty(),
            RawValue::Map(m) => m.is_empty(),
            RawValue::List(l) => l.is_empty(),
        }
    }

    /// Text form of a scalar parameter (e.g. `model`).
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Encoded(s) => Some(s.trim().to_string()),
            RawValue::Scalar(Value::Null) => None,
            RawValue::Scalar(v) => Some(v.to_string()),
            RawValue::Map(_) | RawValue::List(_) => None,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("empty entry in '{0}'")]
    EmptyEntry(String),
    #[error("entry '{0}' is not a field:value pair")]
    MissingColon(String),
    #[error("entry '{0}' has an empty field name")]
    EmptyKey(String),
    #[error("expected a list of field names, got {0}")]
    NotAList(&'static str),
    #[error("expected field:value pairs or an object, got {0}")]
    NotPairs(&'static str),
    #[error("invalid JSON object: {0}")]
    Json(String),
}

/// Parse the pair-list grammar. Each entry splits on its first `:`; values stay strings.
/// Structured maps pass through unchanged; a string holding a JSON object is decoded.
pub fn parse_pairs(raw: &RawValue) -> Result<Vec<(String, Value)>, ParseError> {
    match raw {
        RawValue::Map(m) => Ok(m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        RawValue::Encoded(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(Vec::new());
            }
            if s.starts_with('{') {
                let map: Map<String, Value> =
                    serde_json::from_str(s).map_err(|e| ParseError::Json(e.to_string()))?;
                return Ok(map.into_iter().collect());
            }
            split_entries(s)?.into_iter().map(parse_pair).collect()
        }
        RawValue::Scalar(_) => Err(ParseError::NotPairs("a scalar")),
        RawValue::List(_) => Err(ParseError::NotPairs("a list")),
    }
}

/// Comma-separated entries, trimmed. An empty entry (`a,,b`, trailing comma) is an error in both grammars.
fn split_entries(s: &str) -> Result<Vec<&str>, ParseError> {
    s.split(',')
        .map(str::trim)
        .map(|entry| {
            if entry.is_empty() {
                Err(ParseError::EmptyEntry(s.to_string()))
            } else {
                Ok(entry)
            }
        })
        .collect()
}

fn parse_pair(entry: &str) -> Result<(String, Value), ParseError> {
    let (key, value) = entry
        .split_once(':')
        .ok_or_else(|| ParseError::MissingColon(entry.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(entry.to_string()));
    }
    Ok((key.to_string(), Value::String(value.trim().to_string())))
}

/// Parse the value-list grammar into an ordered list of strings. Lists pass through.
pub fn parse_values(raw: &RawValue) -> Result<Vec<String>, ParseError> {
    match raw {
        RawValue::Encoded(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(Vec::new());
            }
            Ok(split_entries(s)?.into_iter().map(String::from).collect())
        }
        RawValue::List(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) if s.trim().is_empty() => Err(ParseError::EmptyEntry(s.clone())),
                Value::String(s) => Ok(s.trim().to_string()),
                _ => Err(ParseError::NotAList("a non-string list item")),
            })
            .collect(),
        RawValue::Scalar(_) => Err(ParseError::NotAList("a scalar")),
        RawValue::Map(_) => Err(ParseError::NotAList("an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enc(s: &str) -> RawValue {
        RawValue::Encoded(s.into())
    }

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs(&enc("a:1,b:2")).unwrap();
        assert_eq!(
            pairs,
            vec![("a".to_string(), json!("1")), ("b".to_string(), json!("2"))]
        );
    }

    #[test]
    fn test_parse_pairs_splits_on_first_colon() {
        let pairs = parse_pairs(&enc("url:http://x")).unwrap();
        assert_eq!(pairs, vec![("url".to_string(), json!("http://x"))]);
    }

    #[test]
    fn test_parse_pairs_rejects_missing_colon() {
        assert_eq!(
            parse_pairs(&enc("a:1,b")),
            Err(ParseError::MissingColon("b".into()))
        );
        assert!(matches!(parse_pairs(&enc(":1")), Err(ParseError::EmptyKey(_))));
    }

    #[test]
    fn test_parse_pairs_passes_maps_through() {
        let raw = RawValue::from(json!({"id": 1, "name": "x"}));
        let pairs = parse_pairs(&raw).unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("id".to_string(), json!(1))));
    }

    #[test]
    fn test_parse_pairs_decodes_json_string() {
        let pairs = parse_pairs(&enc(r#"{"name": "x"}"#)).unwrap();
        assert_eq!(pairs, vec![("name".to_string(), json!("x"))]);
        assert!(matches!(parse_pairs(&enc("{oops")), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_values(&enc("a,-b")).unwrap(), vec!["a", "-b"]);
        assert_eq!(parse_values(&enc(" a , b ")).unwrap(), vec!["a", "b"]);
        let list = RawValue::from(json!(["name", "-id"]));
        assert_eq!(parse_values(&list).unwrap(), vec!["name", "-id"]);
        assert!(parse_values(&RawValue::from(json!({"a": 1}))).is_err());
    }

    #[test]
    fn test_empty_entries_rejected_by_both_grammars() {
        for raw in ["id:1,", "id:1,,name:x", ",id:1"] {
            assert!(matches!(parse_pairs(&enc(raw)), Err(ParseError::EmptyEntry(_))), "{}", raw);
        }
        for raw in ["name,", "a,,b", " , "] {
            assert!(matches!(parse_values(&enc(raw)), Err(ParseError::EmptyEntry(_))), "{}", raw);
        }
        assert!(matches!(
            parse_values(&RawValue::from(json!(["name", ""]))),
            Err(ParseError::EmptyEntry(_))
        ));
        assert_eq!(parse_pairs(&enc("")).unwrap(), vec![]);
        assert_eq!(parse_values(&enc("")).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_blank_values() {
        assert!(enc("  ").is_blank());
        assert!(RawValue::from(json!({})).is_blank());
        assert!(!RawValue::from(json!(0)).is_blank());
    }
}
