//! Field validation against an entity's schema. Every filter, sort and field name
//! passes through here before storage is touched.

use crate::config::{EntityDescriptor, Record};
use crate::error::ApiError;
use crate::query::filter::{field_of, split_key};
use crate::query::{FilterClause, FilterSpec, SortSpec};
use serde_json::Value;

pub struct FieldValidator;

impl FieldValidator {
    /// Every name must be a non-relational field of `entity`. Fails on the first unknown one.
    pub fn validate<'a, I>(field_names: I, entity: &EntityDescriptor) -> Result<(), ApiError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in field_names {
            match entity.field(name) {
                Some(f) if !f.is_relation() => {}
                _ => {
                    return Err(ApiError::UnknownField {
                        field: name.to_string(),
                        entity: entity.name.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Filter keys: only the segment before the first `__` is checked.
    pub fn validate_filter<'a, I>(keys: I, entity: &EntityDescriptor) -> Result<(), ApiError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::validate(keys.into_iter().map(field_of), entity)
    }

    /// Sort keys: the descending marker is stripped before the check.
    pub fn validate_sort(sort: &SortSpec, entity: &EntityDescriptor) -> Result<(), ApiError> {
        Self::validate(sort.keys.iter().map(|k| k.field.as_str()), entity)
    }

    /// Fields written by create/update: must exist and be writable.
    pub fn validate_assignable<'a, I>(field_names: I, entity: &EntityDescriptor) -> Result<(), ApiError>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        Self::validate(field_names.clone(), entity)?;
        for name in field_names {
            if entity.field(name).map(|f| f.read_only).unwrap_or(false) {
                return Err(ApiError::ReadOnlyField {
                    field: name.to_string(),
                    entity: entity.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validate filter pairs and build a typed filter spec.
pub fn build_filter(entity: &EntityDescriptor, pairs: &[(String, Value)]) -> Result<FilterSpec, ApiError> {
    FieldValidator::validate_filter(pairs.iter().map(|(k, _)| k.as_str()), entity)?;
    let mut clauses = Vec::with_capacity(pairs.len());
    for (key, raw) in pairs {
        let (field, lookup) =
            split_key(key).ok_or_else(|| ApiError::MalformedFilter(format!("unknown lookup in '{}'", key)))?;
        let value = if lookup.is_text() {
            match raw {
                Value::String(_) => raw.clone(),
                Value::Number(_) | Value::Bool(_) => Value::String(raw.to_string()),
                _ => return Err(ApiError::MalformedFilter(format!("'{}' expects a text value", key))),
            }
        } else {
            entity.coerce(field, raw)?
        };
        clauses.push(FilterClause {
            field: field.to_string(),
            lookup,
            value,
        });
    }
    Ok(FilterSpec { clauses })
}

/// Validate assignment pairs and run each value through its field's typed setter.
pub fn build_assignments(entity: &EntityDescriptor, pairs: &[(String, Value)]) -> Result<Record, ApiError> {
    FieldValidator::validate_assignable(pairs.iter().map(|(k, _)| k.as_str()), entity)?;
    pairs
        .iter()
        .map(|(k, v)| entity.coerce(k, v).map(|value| (k.clone(), value)))
        .collect()
}
