//! Resolved model: schema config validated and flattened into immutable entity descriptors.

use crate::case::normalize_model_name;
use crate::config::scalar::{ScalarType, Setter};
use crate::error::ApiError;
use axum::http::Method;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A stored record as exchanged with a storage collaborator.
pub type Record = Map<String, Value>;

/// HTTP verbs the facade dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }

    /// Exact match on the request method; HTTP method tokens are case-sensitive.
    pub fn from_method(method: &Method) -> Option<Self> {
        Verb::ALL.into_iter().find(|v| v.method() == *method)
    }

    /// Verb names in schema config, any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(Verb::Get),
            "POST" => Some(Verb::Post),
            "PUT" => Some(Verb::Put),
            "DELETE" => Some(Verb::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarType),
    /// References another entity (normalized name). Never serialized, filtered, sorted or assigned.
    Relation { target: String },
}

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
    pub default: Value,
    pub read_only: bool,
}

impl FieldSpec {
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.kind {
            FieldKind::Scalar(t) => Some(t),
            FieldKind::Relation { .. } => None,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation { .. })
    }
}

#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    /// Case-normalized name, the registry key.
    pub name: String,
    pub table: String,
    pub id_field: String,
    pub fields: Vec<FieldSpec>,
    pub allowed_methods: HashSet<Verb>,
    /// One typed setter per scalar field, built once.
    setters: HashMap<String, Setter>,
}

impl EntityDescriptor {
    pub fn new(
        name: String,
        table: String,
        id_field: String,
        fields: Vec<FieldSpec>,
        allowed_methods: HashSet<Verb>,
    ) -> Self {
        let setters = fields
            .iter()
            .filter_map(|f| f.scalar_type().map(|t| (f.name.clone(), t.setter())))
            .collect();
        EntityDescriptor {
            name,
            table,
            id_field,
            fields,
            allowed_methods,
            setters,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Non-relational fields in declaration order.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.is_relation())
    }

    pub fn allows(&self, verb: Verb) -> bool {
        self.allowed_methods.contains(&verb)
    }

    /// Coerce a raw value through the field's typed setter.
    pub fn coerce(&self, field: &str, raw: &Value) -> Result<Value, ApiError> {
        let setter = self.setters.get(field).ok_or_else(|| ApiError::UnknownField {
            field: field.to_string(),
            entity: self.name.clone(),
        })?;
        setter(raw).map_err(|reason| ApiError::InvalidValue {
            field: field.to_string(),
            entity: self.name.clone(),
            reason,
        })
    }

    /// Defaults for every scalar, writable field; the starting point of a created record.
    pub fn defaults(&self) -> Record {
        self.scalar_fields()
            .filter(|f| !f.read_only)
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect()
    }

    /// JSON-safe representation with relational fields stripped.
    pub fn serialize(&self, record: &Record) -> Value {
        let map: Record = self
            .scalar_fields()
            .map(|f| (f.name.clone(), record.get(&f.name).cloned().unwrap_or(Value::Null)))
            .collect();
        Value::Object(map)
    }

    pub fn id_of<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.get(&self.id_field).filter(|v| !v.is_null())
    }
}

/// Registry of all known entities, keyed by normalized name. Immutable after startup.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    entities: HashMap<String, EntityDescriptor>,
}

impl ModelRegistry {
    pub fn new(descriptors: Vec<EntityDescriptor>) -> Self {
        ModelRegistry {
            entities: descriptors.into_iter().map(|d| (d.name.clone(), d)).collect(),
        }
    }

    /// Look up a model by name, normalizing casing per underscore segment.
    pub fn resolve(&self, model_name: &str) -> Option<&EntityDescriptor> {
        self.entities.get(&normalize_model_name(model_name))
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category() -> EntityDescriptor {
        EntityDescriptor::new(
            "PROJECT_CATEGORY".into(),
            "project_category".into(),
            "id".into(),
            vec![
                FieldSpec {
                    name: "id".into(),
                    column: "id".into(),
                    kind: FieldKind::Scalar(ScalarType::Integer),
                    default: Value::Null,
                    read_only: true,
                },
                FieldSpec {
                    name: "name".into(),
                    column: "name".into(),
                    kind: FieldKind::Scalar(ScalarType::Text),
                    default: json!(""),
                    read_only: false,
                },
                FieldSpec {
                    name: "parent".into(),
                    column: "parent_id".into(),
                    kind: FieldKind::Relation {
                        target: "PROJECT_CATEGORY".into(),
                    },
                    default: Value::Null,
                    read_only: false,
                },
            ],
            Verb::ALL.into_iter().collect(),
        )
    }

    #[test]
    fn test_from_method_is_case_sensitive() {
        assert_eq!(Verb::from_method(&Method::GET), Some(Verb::Get));
        assert_eq!(Verb::from_method(&Method::DELETE), Some(Verb::Delete));
        let lower = Method::from_bytes(b"get").unwrap();
        assert_eq!(Verb::from_method(&lower), None);
        assert_eq!(Verb::from_method(&Method::PATCH), None);
        assert_eq!(Verb::parse("get"), Some(Verb::Get));
    }

    #[test]
    fn test_resolve_is_case_insensitive_per_segment() {
        let registry = ModelRegistry::new(vec![category()]);
        let a = registry.resolve("project_category").map(|e| e.name.clone());
        let b = registry.resolve("PROJECT_CATEGORY").map(|e| e.name.clone());
        assert_eq!(a, Some("PROJECT_CATEGORY".to_string()));
        assert_eq!(a, b);
        assert!(registry.resolve("BOGUS").is_none());
    }

    #[test]
    fn test_serialize_strips_relations() {
        let entity = category();
        let mut record = Record::new();
        record.insert("id".into(), json!(1));
        record.insert("name".into(), json!("web"));
        record.insert("parent".into(), json!(3));
        assert_eq!(entity.serialize(&record), json!({"id": 1, "name": "web"}));
    }

    #[test]
    fn test_defaults_skip_id_and_relations() {
        let entity = category();
        let defaults = entity.defaults();
        assert_eq!(Value::Object(defaults), json!({"name": ""}));
    }

    #[test]
    fn test_coerce_rejects_relation() {
        let entity = category();
        assert!(matches!(
            entity.coerce("parent", &json!(1)),
            Err(ApiError::UnknownField { .. })
        ));
        assert_eq!(entity.coerce("id", &json!("4")).unwrap(), json!(4));
    }
}
