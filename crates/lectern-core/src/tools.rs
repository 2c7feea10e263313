//! Tool definitions advertised to the completion endpoint.
//!
//! A [`ToolDefinition`] is the declarative half of a tool: name, description,
//! and a JSON-schema argument declaration. The executable half is the typed
//! invocation enum in `lectern-runtime`; the two are kept in sync by the
//! registry there.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative tool description consumed by the completion endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// Argument schema.
    pub parameters: ToolParameterSchema,
}

/// JSON-schema object declaration for tool arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// Always `"object"`.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property name → property schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
    /// Names of required properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// Fluent builder for [`ToolDefinition`] schemas.
///
/// ```
/// use lectern_core::tools::ToolSchemaBuilder;
/// use serde_json::json;
///
/// let tool = ToolSchemaBuilder::new("read_entry", "Read one transcript entry")
///     .required_property("entry_id", json!({"type": "integer"}))
///     .build();
/// assert_eq!(tool.name, "read_entry");
/// ```
pub struct ToolSchemaBuilder {
    name: String,
    description: String,
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchemaBuilder {
    /// Create a new builder with the given tool name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Add an optional property.
    pub fn property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self
    }

    /// Add a required property.
    pub fn required_property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self.required.push(name.into());
        self
    }

    /// Build the final [`ToolDefinition`].
    pub fn build(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name,
            description: self.description,
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: if self.properties.is_empty() {
                    None
                } else {
                    Some(self.properties)
                },
                required: if self.required.is_empty() {
                    None
                } else {
                    Some(self.required)
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_schema() {
        let tool = ToolSchemaBuilder::new("noop", "No params").build();
        assert_eq!(tool.parameters.schema_type, "object");
        assert!(tool.parameters.properties.is_none());
        assert!(tool.parameters.required.is_none());
    }

    #[test]
    fn required_property_in_both_properties_and_required() {
        let tool = ToolSchemaBuilder::new("t", "d")
            .required_property("answer", json!({"type": "string"}))
            .build();
        assert!(tool.parameters.properties.unwrap().contains_key("answer"));
        assert_eq!(tool.parameters.required.unwrap(), vec!["answer"]);
    }

    #[test]
    fn optional_property_not_in_required() {
        let tool = ToolSchemaBuilder::new("t", "d")
            .property("speaker", json!({"type": "string"}))
            .required_property("keywords", json!({"type": "array"}))
            .build();
        let props = tool.parameters.properties.unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(tool.parameters.required.unwrap(), vec!["keywords"]);
    }

    #[test]
    fn serializes_as_json_schema() {
        let tool = ToolSchemaBuilder::new("t", "d")
            .required_property("entry_id", json!({"type": "integer"}))
            .build();
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["parameters"]["type"], "object");
        assert_eq!(
            json["parameters"]["properties"]["entry_id"]["type"],
            "integer"
        );
    }
}
