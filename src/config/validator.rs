//! Schema config validation: identifiers, uniqueness and relation targets.

use crate::case::normalize_model_name;
use crate::config::resolved::Verb;
use crate::config::scalar::ScalarType;
use crate::config::{MethodsConfig, SchemaConfig};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const RELATION_TYPE: &str = "relation";

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"))
}

fn check_identifier(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    if identifier_re().is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

pub fn is_relation_type(type_name: &str) -> bool {
    type_name.eq_ignore_ascii_case(RELATION_TYPE)
}

/// Expand a methods config into verbs. Unknown verbs are errors.
pub fn parse_methods(methods: &MethodsConfig) -> Result<HashSet<Verb>, ConfigError> {
    let names: Vec<&str> = match methods {
        MethodsConfig::Keyword(k) if k.eq_ignore_ascii_case("ALL") || k == "*" => {
            return Ok(Verb::ALL.into_iter().collect());
        }
        MethodsConfig::Keyword(k) => vec![k.as_str()],
        MethodsConfig::List(v) => v.iter().map(String::as_str).collect(),
    };
    names
        .into_iter()
        .map(|n| Verb::parse(n).ok_or_else(|| ConfigError::Validation(format!("unknown method '{}'", n))))
        .collect()
}

pub fn validate(config: &SchemaConfig) -> Result<(), ConfigError> {
    if config.entities.is_empty() {
        return Err(ConfigError::Validation("at least one entity required".into()));
    }

    let mut entity_names = HashSet::new();
    for e in &config.entities {
        check_identifier("entity", &e.name)?;
        if !entity_names.insert(normalize_model_name(&e.name)) {
            return Err(ConfigError::Duplicate {
                kind: "entity",
                name: e.name.clone(),
            });
        }
    }

    for e in &config.entities {
        if let Some(table) = &e.table {
            check_identifier("table", table)?;
        }
        if let Some(id) = &e.id_field {
            check_identifier("id field", id)?;
        }
        parse_methods(&e.methods)?;

        let mut field_names = HashSet::new();
        for f in &e.fields {
            check_identifier("field", &f.name)?;
            if f.name.contains("__") {
                return Err(ConfigError::InvalidIdentifier {
                    kind: "field",
                    name: f.name.clone(),
                });
            }
            if let Some(col) = &f.column {
                check_identifier("column", col)?;
            }
            if !field_names.insert(f.name.as_str()) {
                return Err(ConfigError::Duplicate {
                    kind: "field",
                    name: format!("{}.{}", e.name, f.name),
                });
            }
            if is_relation_type(&f.type_) {
                let target = f.target.as_deref().ok_or_else(|| {
                    ConfigError::Validation(format!("relation {}.{} has no target", e.name, f.name))
                })?;
                if !entity_names.contains(&normalize_model_name(target)) {
                    return Err(ConfigError::MissingReference {
                        kind: "entity",
                        id: target.to_string(),
                    });
                }
                if f.default.is_some() {
                    return Err(ConfigError::Validation(format!(
                        "relation {}.{} cannot declare a default",
                        e.name, f.name
                    )));
                }
            } else if ScalarType::parse(&f.type_).is_none() {
                return Err(ConfigError::Validation(format!(
                    "unknown type '{}' for {}.{}",
                    f.type_, e.name, f.name
                )));
            }
        }
    }
    Ok(())
}
