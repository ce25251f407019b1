//! OpenAPI document structs for serde deserialization.
//!
//! Only the parts the built-in plugins read are modelled. Both OpenAPI 3.x
//! (`components.schemas`) and Swagger 2.0 (`definitions`) layouts are
//! accepted; nothing is validated.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use specgen_core::refs::{json_pointer_to_path, normalize_json_pointer, path_to_json_pointer};
use tracing::debug;

/// HTTP methods in the order operations are generated.
pub const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Root document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenApiDocument {
    /// `openapi` version string (3.x documents).
    #[serde(default)]
    pub openapi: Option<String>,
    /// `swagger` version string (2.0 documents).
    #[serde(default)]
    pub swagger: Option<String>,
    /// Server list; the first URL becomes the client's base URL.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Paths keyed by template, in document order.
    #[serde(default)]
    pub paths: IndexMap<String, IndexMap<String, Value>>,
    /// OpenAPI 3.x components.
    #[serde(default)]
    pub components: Option<Components>,
    /// Swagger 2.0 definitions.
    #[serde(default)]
    pub definitions: Option<IndexMap<String, Schema>>,
}

/// A server entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// Base URL.
    pub url: String,
}

/// Reusable components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Named schemas.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

/// `type` may be a single name or, in OpenAPI 3.1, a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// `additionalProperties` is either a flag or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` / `false`
    Bool(bool),
    /// A value schema.
    Schema(Box<Schema>),
}

/// JSON Schema subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Reference to another schema.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Schema type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Format hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Description, copied into doc comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object properties in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Array items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Allowed values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Constant value.
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    /// Union members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
    /// Exclusive union members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    /// Intersection members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    /// Map value schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    /// OpenAPI 3.0 nullability flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl Schema {
    /// Whether `null` is an allowed value.
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true)
            || matches!(&self.schema_type, Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null"))
    }

    /// Type names other than `null`.
    pub fn type_names(&self) -> Vec<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(name)) => vec![name.as_str()],
            Some(SchemaType::Multiple(names)) => names
                .iter()
                .map(String::as_str)
                .filter(|name| *name != "null")
                .collect(),
            None => Vec::new(),
        }
    }
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// 3.x parameter schema.
    #[serde(default)]
    pub schema: Option<Schema>,
    /// 2.0 inline type.
    #[serde(default, rename = "type")]
    pub inline_type: Option<String>,
}

impl Parameter {
    /// The parameter schema, falling back to the Swagger 2.0 inline type.
    pub fn schema(&self) -> Schema {
        self.schema.clone().unwrap_or_else(|| Schema {
            schema_type: self.inline_type.clone().map(SchemaType::Single),
            ..Schema::default()
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperation {
    #[serde(default)]
    operation_id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    request_body: Option<RawBody>,
    #[serde(default)]
    responses: IndexMap<String, RawBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawBody {
    #[serde(default)]
    required: bool,
    #[serde(default)]
    content: IndexMap<String, MediaType>,
    /// Swagger 2.0 response schema.
    #[serde(default)]
    schema: Option<Schema>,
}

impl RawBody {
    fn json_schema(&self) -> Option<Schema> {
        self.content
            .iter()
            .find(|(media, _)| media.contains("json"))
            .or_else(|| self.content.first())
            .and_then(|(_, media)| media.schema.clone())
            .or_else(|| self.schema.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MediaType {
    #[serde(default)]
    schema: Option<Schema>,
}

/// A named component schema.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    /// Component name.
    pub name: String,
    /// `$ref` pointer to the component.
    pub reference: String,
    /// The schema.
    pub schema: Schema,
}

/// One operation under `paths`.
#[derive(Debug, Clone)]
pub struct OperationEntry {
    /// Lowercase HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// Pointer to the operation object.
    pub reference: String,
    /// `operationId`, when present.
    pub operation_id: Option<String>,
    /// Summary line.
    pub summary: Option<String>,
    /// Path-level parameters followed by operation parameters.
    pub parameters: Vec<Parameter>,
    /// JSON request body schema and whether it is required.
    pub body: Option<(Schema, bool)>,
    /// Schema of the first 2xx (or default) response.
    pub response: Option<Schema>,
}

impl OpenApiDocument {
    /// Parse a JSON or YAML document. JSON is tried first for `.json` files,
    /// YAML otherwise (YAML also accepts JSON).
    pub fn parse(text: &str, json_first: bool) -> Result<Self, String> {
        if json_first && let Ok(document) = serde_json::from_str(text) {
            return Ok(document);
        }
        serde_yaml::from_str(text).map_err(|err| format!("Failed to parse OpenAPI document: {err}"))
    }

    /// Read and parse a document from disk.
    pub fn read(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        let json_first = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let document = Self::parse(&text, json_first)?;
        debug!(
            path = %path.display(),
            openapi = ?document.openapi,
            swagger = ?document.swagger,
            "Loaded OpenAPI document."
        );
        Ok(document)
    }

    /// Component schemas with their pointers, in document order.
    pub fn schemas(&self) -> Vec<SchemaEntry> {
        let components = self
            .components
            .iter()
            .flat_map(|components| &components.schemas)
            .map(|(name, schema)| (["components", "schemas", name.as_str()], name, schema));
        let mut entries: Vec<SchemaEntry> = components
            .map(|(path, name, schema)| SchemaEntry {
                name: name.clone(),
                reference: path_to_json_pointer(&path),
                schema: schema.clone(),
            })
            .collect();
        entries.extend(self.definitions.iter().flatten().map(|(name, schema)| SchemaEntry {
            name: name.clone(),
            reference: path_to_json_pointer(&["definitions", name.as_str()]),
            schema: schema.clone(),
        }));
        entries
    }

    /// Operations in path order, methods in [`METHODS`] order.
    ///
    /// Malformed operation objects are skipped with a debug log.
    pub fn operations(&self) -> Vec<OperationEntry> {
        let mut operations = Vec::new();
        for (path, item) in &self.paths {
            let shared: Vec<Parameter> = item
                .get("parameters")
                .and_then(|value| serde_json::from_value(value.clone()).ok())
                .unwrap_or_default();
            for method in METHODS {
                let Some(value) = item.get(method) else {
                    continue;
                };
                let raw: RawOperation = match serde_json::from_value(value.clone()) {
                    Ok(raw) => raw,
                    Err(err) => {
                        debug!(path = %path, method, error = %err, "Skipping malformed operation.");
                        continue;
                    }
                };
                let mut parameters = shared.clone();
                for parameter in raw.parameters {
                    parameters.retain(|existing| {
                        existing.name != parameter.name || existing.location != parameter.location
                    });
                    parameters.push(parameter);
                }
                let response = raw
                    .responses
                    .iter()
                    .find(|(status, _)| status.starts_with('2'))
                    .or_else(|| raw.responses.get_key_value("default"))
                    .and_then(|(_, body)| body.json_schema());
                let body = raw
                    .request_body
                    .as_ref()
                    .and_then(|body| body.json_schema().map(|schema| (schema, body.required)))
                    .or_else(|| {
                        parameters
                            .iter()
                            .find(|parameter| parameter.location == "body")
                            .map(|parameter| (parameter.schema(), parameter.required))
                    });
                operations.push(OperationEntry {
                    method: method.to_string(),
                    path: path.clone(),
                    reference: path_to_json_pointer(&["paths", path.as_str(), method]),
                    operation_id: raw.operation_id,
                    summary: raw.summary,
                    parameters: parameters
                        .into_iter()
                        .filter(|parameter| parameter.location != "body")
                        .collect(),
                    body,
                    response,
                });
            }
        }
        operations
    }

    /// First server URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.servers.first().map(|server| server.url.as_str())
    }

    /// The schema a local `$ref` points at, if this document holds one.
    pub fn resolve_schema(&self, pointer: &str) -> Option<Schema> {
        let path = json_pointer_to_path(&normalize_json_pointer(pointer));
        let (root, rest) = path.split_first()?;
        let value = match root.as_str() {
            "paths" => serde_json::to_value(&self.paths),
            "components" => serde_json::to_value(self.components.as_ref()?),
            "definitions" => serde_json::to_value(self.definitions.as_ref()?),
            _ => return None,
        }
        .ok()?;
        let tail = path_to_json_pointer(rest);
        let target = value.pointer(tail.trim_start_matches('#'))?;
        serde_json::from_value(target.clone()).ok()
    }
}
