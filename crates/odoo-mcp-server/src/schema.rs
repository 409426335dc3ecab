//! JSON Schema types for operation parameters

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A JSON Schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonSchema {
    String {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Integer {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
    },
    Boolean {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Array {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        items: Option<Box<JsonSchema>>,
    },
    Object {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl JsonSchema {
    pub fn string_with_description(description: impl Into<String>) -> Self {
        Self::String {
            description: Some(description.into()),
        }
    }

    /// Non-negative integer
    pub fn count_with_description(description: impl Into<String>) -> Self {
        Self::Integer {
            description: Some(description.into()),
            minimum: Some(0),
        }
    }

    pub fn boolean_with_description(description: impl Into<String>) -> Self {
        Self::Boolean {
            description: Some(description.into()),
        }
    }

    /// Array with unconstrained items
    pub fn array_with_description(description: impl Into<String>) -> Self {
        Self::Array {
            description: Some(description.into()),
            items: None,
        }
    }

    pub fn array_of(items: JsonSchema, description: impl Into<String>) -> Self {
        Self::Array {
            description: Some(description.into()),
            items: Some(Box::new(items)),
        }
    }

    pub fn object_with_description(description: impl Into<String>) -> Self {
        Self::Object {
            description: Some(description.into()),
        }
    }
}

/// Top-level input schema of an operation (always an object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, JsonSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolSchema {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: JsonSchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn with_required(mut self, required: Vec<String>) -> Self {
        self.required = required;
        self
    }
}
