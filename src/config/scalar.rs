//! Scalar field types and their coercion setters.

use serde_json::{Number, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Uuid,
}

/// Typed setter: coerces a loosely typed request value into the field's canonical JSON form.
pub type Setter = fn(&Value) -> Result<Value, String>;

impl ScalarType {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_lowercase().as_str() {
            "text" | "string" | "char" => ScalarType::Text,
            "integer" | "int" | "bigint" => ScalarType::Integer,
            "float" | "double" | "real" => ScalarType::Float,
            "boolean" | "bool" => ScalarType::Boolean,
            "timestamp" | "datetime" | "timestamptz" => ScalarType::Timestamp,
            "uuid" => ScalarType::Uuid,
            _ => return None,
        })
    }

    pub fn setter(self) -> Setter {
        match self {
            ScalarType::Text => set_text,
            ScalarType::Integer => set_integer,
            ScalarType::Float => set_float,
            ScalarType::Boolean => set_boolean,
            ScalarType::Timestamp => set_timestamp,
            ScalarType::Uuid => set_uuid,
        }
    }

    /// Value a created record gets when neither the request nor the schema supplies one.
    pub fn type_default(self) -> Value {
        match self {
            ScalarType::Text => Value::String(String::new()),
            ScalarType::Integer => Value::Number(0.into()),
            ScalarType::Float => Value::from(0.0),
            ScalarType::Boolean => Value::Bool(false),
            ScalarType::Timestamp | ScalarType::Uuid => Value::Null,
        }
    }

    /// PostgreSQL cast applied to text-bound parameters.
    pub fn pg_cast(self) -> &'static str {
        match self {
            ScalarType::Text => "text",
            ScalarType::Integer => "bigint",
            ScalarType::Float => "double precision",
            ScalarType::Boolean => "boolean",
            ScalarType::Timestamp => "timestamptz",
            ScalarType::Uuid => "uuid",
        }
    }
}

fn set_text(v: &Value) -> Result<Value, String> {
    match v {
        Value::Null => Ok(Value::Null),
        Value::String(_) => Ok(v.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err("expected a text value".into()),
    }
}

fn set_integer(v: &Value) -> Result<Value, String> {
    match v {
        Value::Null => Ok(Value::Null),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(v.clone()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| format!("'{}' is not an integer", s)),
        _ => Err("expected an integer".into()),
    }
}

fn set_float(v: &Value) -> Result<Value, String> {
    let f = match v {
        Value::Null => return Ok(Value::Null),
        Value::Number(n) => n.as_f64().ok_or("expected a number")?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", s))?,
        _ => return Err("expected a number".into()),
    };
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| "number must be finite".into())
}

fn set_boolean(v: &Value) -> Result<Value, String> {
    match v {
        Value::Null | Value::Bool(_) => Ok(v.clone()),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(Value::Bool(false)),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(Value::Bool(true)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(format!("'{}' is not a boolean", s)),
        },
        _ => Err("expected a boolean".into()),
    }
}

fn set_timestamp(v: &Value) -> Result<Value, String> {
    match v {
        Value::Null => Ok(Value::Null),
        Value::String(s) => chrono::DateTime::parse_from_rfc3339(s.trim())
            .map(|d| Value::String(d.with_timezone(&chrono::Utc).to_rfc3339()))
            .map_err(|e| format!("'{}' is not an RFC 3339 timestamp: {}", s, e)),
        _ => Err("expected an RFC 3339 timestamp string".into()),
    }
}

fn set_uuid(v: &Value) -> Result<Value, String> {
    match v {
        Value::Null => Ok(Value::Null),
        Value::String(s) => uuid::Uuid::parse_str(s.trim())
            .map(|u| Value::String(u.to_string()))
            .map_err(|_| format!("'{}' is not a uuid", s)),
        _ => Err("expected a uuid string".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_setter_accepts_query_strings() {
        let set = ScalarType::Integer.setter();
        assert_eq!(set(&json!("1")).unwrap(), json!(1));
        assert_eq!(set(&json!(7)).unwrap(), json!(7));
        assert!(set(&json!("one")).is_err());
        assert!(set(&json!(1.5)).is_err());
    }

    #[test]
    fn test_boolean_setter() {
        let set = ScalarType::Boolean.setter();
        assert_eq!(set(&json!("yes")).unwrap(), json!(true));
        assert_eq!(set(&json!(0)).unwrap(), json!(false));
        assert!(set(&json!("maybe")).is_err());
    }

    #[test]
    fn test_text_setter_renders_scalars() {
        let set = ScalarType::Text.setter();
        assert_eq!(set(&json!(12)).unwrap(), json!("12"));
        assert!(set(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_timestamp_setter_normalizes_to_utc() {
        let set = ScalarType::Timestamp.setter();
        assert_eq!(
            set(&json!("2024-01-01T02:00:00+02:00")).unwrap(),
            json!("2024-01-01T00:00:00+00:00")
        );
        assert!(set(&json!("yesterday")).is_err());
    }

    #[test]
    fn test_uuid_setter_canonicalizes() {
        let set = ScalarType::Uuid.setter();
        assert_eq!(
            set(&json!("67E55044-10B1-426F-9247-BB680E5FE0C8")).unwrap(),
            json!("67e55044-10b1-426f-9247-bb680e5fe0c8")
        );
    }

    #[test]
    fn test_parse_type_names() {
        assert_eq!(ScalarType::parse("Text"), Some(ScalarType::Text));
        assert_eq!(ScalarType::parse("int"), Some(ScalarType::Integer));
        assert_eq!(ScalarType::parse("relation"), None);
    }
}
