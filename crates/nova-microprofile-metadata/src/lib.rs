//! Wire schema for MicroProfile configuration metadata.
//!
//! These are the property and hint descriptors a properties language server
//! consumes (`application.properties` / `microprofile-config.properties`
//! completion, hover and validation). Field names serialize in camelCase and
//! optional fields are omitted when unset.

mod collector;

pub use collector::PropertiesCollector;

use serde::{Deserialize, Serialize};

/// Phase reported for every MicroProfile (runtime) property.
pub const CONFIG_PHASE_RUNTIME: u32 = 0;

/// A configuration property that can be set in a configuration source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub phase: u32,
    /// Whether the property comes from a compiled dependency rather than sources.
    #[serde(default)]
    pub binary: bool,
}

impl ItemMetadata {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            description: None,
            source_type: None,
            source_field: None,
            source_method: None,
            default_value: None,
            extension_name: None,
            required: false,
            phase: CONFIG_PHASE_RUNTIME,
            binary: false,
        }
    }
}

/// A set of suggested values for properties of a given type (usually an enum).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemHint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub values: Vec<ValueHint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueHint {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

impl ValueHint {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
            source_type: None,
        }
    }
}

/// Properties and hints collected for one project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_uri: Option<String>,
    pub properties: Vec<ItemMetadata>,
    pub hints: Vec<ItemHint>,
}

impl ProjectInfo {
    pub fn property(&self, name: &str) -> Option<&ItemMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn hint(&self, name: &str) -> Option<&ItemHint> {
        self.hints.iter().find(|h| h.name == name)
    }
}
