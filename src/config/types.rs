//! Raw schema config types matching the JSON schema file.

use serde::{Deserialize, Serialize};

/// Allowed methods for an entity: the keyword "ALL" or an explicit verb list.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodsConfig {
    Keyword(String),
    List(Vec<String>),
}

impl Default for MethodsConfig {
    fn default() -> Self {
        MethodsConfig::Keyword("ALL".into())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    /// text, integer, float, boolean, timestamp, uuid or relation.
    #[serde(rename = "type")]
    pub type_: String,
    /// Target entity name; relation fields only.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Storage column; defaults to the field name (`<name>_id` for relations).
    #[serde(default)]
    pub column: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub id_field: Option<String>,
    #[serde(default)]
    pub methods: MethodsConfig,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// The closed set of entity schemas known at startup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub entities: Vec<EntityConfig>,
}
