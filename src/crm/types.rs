//! CRM API models and merged record types

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Keys tried, in order, to find a record's identifier
pub const ID_KEYS: &[&str] = &["id", "objectId", "object_id"];

/// One property definition from `crm/v3/properties/<object>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

/// Response body of the properties endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertiesResponse {
    #[serde(default)]
    pub results: Vec<PropertyDefinition>,
}

/// One custom object schema from `crm-object-schemas/v3/schemas`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub object_type_id: Option<String>,
    #[serde(default)]
    pub properties: Vec<JsonValue>,
}

impl ObjectSchema {
    /// Number of properties defined by this schema
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Response body of the schemas endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemasResponse {
    #[serde(default)]
    pub results: Vec<ObjectSchema>,
}

/// All fields fetched for one record, unioned across property chunks
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub id: String,
    pub properties: JsonObject,
}

impl MergedRecord {
    /// Create an empty record
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: JsonObject::new(),
        }
    }
}

/// Resolve a raw record's identifier
///
/// Null, empty-string and zero identifiers are treated as absent, so the
/// next key is tried. Numeric identifiers are rendered as decimal text.
pub fn record_id(record: &JsonValue) -> Option<String> {
    ID_KEYS.iter().find_map(|key| match record.get(*key)? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}
