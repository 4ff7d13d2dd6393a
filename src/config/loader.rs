//! Load schema config from a JSON file or string and resolve it into the model registry.

use crate::case::{normalize_model_name, to_snake_case};
use crate::config::resolved::{EntityDescriptor, FieldKind, FieldSpec, ModelRegistry};
use crate::config::scalar::ScalarType;
use crate::config::validator::{is_relation_type, parse_methods};
use crate::config::{validate, EntityConfig, SchemaConfig};
use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;

const DEFAULT_ID_FIELD: &str = "id";

/// Build the registry from schema config (validates first).
pub fn resolve(config: &SchemaConfig) -> Result<ModelRegistry, ConfigError> {
    validate(config)?;
    let descriptors = config
        .entities
        .iter()
        .map(resolve_entity)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ModelRegistry::new(descriptors))
}

fn resolve_entity(e: &EntityConfig) -> Result<EntityDescriptor, ConfigError> {
    let id_field = e.id_field.clone().unwrap_or_else(|| DEFAULT_ID_FIELD.into());
    let mut fields = Vec::with_capacity(e.fields.len() + 1);

    if !e.fields.iter().any(|f| f.name == id_field) {
        fields.push(FieldSpec {
            name: id_field.clone(),
            column: id_field.clone(),
            kind: FieldKind::Scalar(ScalarType::Integer),
            default: Value::Null,
            read_only: true,
        });
    }

    for f in &e.fields {
        let spec = if is_relation_type(&f.type_) {
            let target = f.target.as_deref().unwrap_or_default();
            FieldSpec {
                name: f.name.clone(),
                column: f.column.clone().unwrap_or_else(|| format!("{}_id", f.name)),
                kind: FieldKind::Relation {
                    target: normalize_model_name(target),
                },
                default: Value::Null,
                read_only: false,
            }
        } else {
            let ty = ScalarType::parse(&f.type_)
                .ok_or_else(|| ConfigError::Validation(format!("unknown type '{}'", f.type_)))?;
            let default = match &f.default {
                Some(raw) => (ty.setter())(raw).map_err(|reason| {
                    ConfigError::Validation(format!("default for {}.{}: {}", e.name, f.name, reason))
                })?,
                None => ty.type_default(),
            };
            FieldSpec {
                name: f.name.clone(),
                column: f.column.clone().unwrap_or_else(|| f.name.clone()),
                kind: FieldKind::Scalar(ty),
                default,
                read_only: f.name == id_field,
            }
        };
        fields.push(spec);
    }

    Ok(EntityDescriptor::new(
        normalize_model_name(&e.name),
        e.table.clone().unwrap_or_else(|| to_snake_case(&e.name)),
        id_field,
        fields,
        parse_methods(&e.methods)?,
    ))
}

pub fn load_from_str(json: &str) -> Result<SchemaConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Read a schema file at startup.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<SchemaConfig, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading schema");
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    load_from_str(&text)
}
