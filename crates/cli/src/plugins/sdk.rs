//! `@specgen/sdk`: one function per operation, calling the shared client.

use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use serde_json::Value;
use specgen_core::PluginDefinition;
use specgen_core::naming::{CaseStyle, IdentifierRequest, Namespace};
use specgen_core::plugins::TagLookup;
use tracing::debug;

use super::ts::{TypeExpr, TypePrinter, doc_comment, escape_string, safe_identifier};
use super::{
    CLIENT_FETCH, CLIENT_REF, CLIENT_TAG, Plugin, PluginRun, SDK, TYPESCRIPT, declaration_id,
    naming_failed,
};
use crate::spec::{OperationEntry, Parameter, Schema, SchemaType};

const PARAMETER_LOCATIONS: [&str; 4] = ["path", "query", "header", "cookie"];

/// Operation functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sdk;

impl Plugin for Sdk {
    fn name(&self) -> &'static str {
        SDK
    }

    fn definition(&self) -> PluginDefinition {
        PluginDefinition::new(SDK)
            .depends_on(TYPESCRIPT)
            .infer(|context| {
                let client =
                    context.plugin_by_tag(TagLookup::new(CLIENT_TAG).fallback(CLIENT_FETCH))?;
                context
                    .config_mut()
                    .insert("client".to_string(), Value::String(client.clone()));
                context.ensure_dependency(&client);
                Ok(())
            })
    }

    fn generate(&self, run: &mut PluginRun<'_>) -> Result<(), String> {
        let client = run
            .context
            .placeholder(CLIENT_REF, Namespace::Value)
            .map_err(|err| naming_failed(&err))?;
        let operations = run.document.operations();
        debug!(count = operations.len(), "Generating operation functions.");

        for operation in &operations {
            let raw = operation_name(operation);
            let rename = move |_: &str| raw.clone();
            let name = run.name(
                IdentifierRequest::new(&operation.reference, Namespace::Value)
                    .case(CaseStyle::Camel)
                    .transform(&rename),
            )?;

            let options = options_schema(operation)
                .map(|schema| print(run, &schema))
                .transpose()?;
            let response = operation
                .response
                .as_ref()
                .map(|schema| print(run, schema))
                .transpose()?;

            let mut dependencies = vec![declaration_id(Namespace::Value, CLIENT_REF)];
            for printed in options.iter().chain(response.iter()) {
                dependencies.extend(
                    printed
                        .references
                        .iter()
                        .map(|reference| declaration_id(Namespace::Type, reference)),
                );
            }

            let parameter = match (&options, options_required(operation)) {
                (Some(options), true) => format!("options: {}", options.text),
                (Some(options), false) => format!("options?: {}", options.text),
                (None, _) => "options?: Record<string, unknown>".to_string(),
            };
            let response_type = response.map_or_else(|| "unknown".to_string(), |printed| printed.text);
            let text = format!(
                "{}export const {} = ({parameter}) => {{\n    return {client}.{}<{response_type}>({{\n        ...options,\n        url: '{}',\n    }});\n}};",
                doc_comment(operation.summary.as_deref(), ""),
                safe_identifier(&name),
                operation.method,
                escape_string(&operation.path),
            );
            run.declare(
                declaration_id(Namespace::Value, &operation.reference),
                text,
                dependencies,
            );
        }
        Ok(())
    }
}

fn print(run: &mut PluginRun<'_>, schema: &Schema) -> Result<TypeExpr, String> {
    TypePrinter::new(&mut *run.context)
        .inline_from(run.document)
        .print(schema)
        .map_err(|err| naming_failed(&err))
}

/// `operationId`, or words built from the method and path
/// (`get /pets/{id}` -> `get pets by id`), cased later by the registry.
fn operation_name(operation: &OperationEntry) -> String {
    if let Some(id) = operation
        .operation_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
    {
        return id.to_string();
    }
    let mut words = vec![operation.method.clone()];
    for segment in operation.path.split('/').filter(|segment| !segment.is_empty()) {
        match segment
            .strip_prefix('{')
            .and_then(|segment| segment.strip_suffix('}'))
        {
            Some(parameter) => {
                words.push("by".to_string());
                words.push(parameter.to_string());
            }
            None => words.push(segment.to_string()),
        }
    }
    words.join(" ").to_lower_camel_case()
}

fn is_required(parameter: &Parameter) -> bool {
    parameter.required || parameter.location == "path"
}

fn options_required(operation: &OperationEntry) -> bool {
    operation.parameters.iter().any(is_required)
        || operation.body.as_ref().is_some_and(|(_, required)| *required)
}

fn object(properties: IndexMap<String, Schema>, required: Vec<String>) -> Schema {
    Schema {
        schema_type: Some(SchemaType::Single("object".to_string())),
        properties: Some(properties),
        required: Some(required),
        ..Schema::default()
    }
}

/// Parameters grouped by location plus the body, as one object schema.
fn options_schema(operation: &OperationEntry) -> Option<Schema> {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for location in PARAMETER_LOCATIONS {
        let parameters: Vec<&Parameter> = operation
            .parameters
            .iter()
            .filter(|parameter| parameter.location == location)
            .collect();
        if parameters.is_empty() {
            continue;
        }
        let group = object(
            parameters
                .iter()
                .map(|parameter| (parameter.name.clone(), parameter.schema()))
                .collect(),
            parameters
                .iter()
                .filter(|parameter| is_required(parameter))
                .map(|parameter| parameter.name.clone())
                .collect(),
        );
        if parameters.iter().any(|parameter| is_required(parameter)) {
            required.push(location.to_string());
        }
        properties.insert(location.to_string(), group);
    }

    if let Some((body, body_required)) = &operation.body {
        properties.insert("body".to_string(), body.clone());
        if *body_required {
            required.push("body".to_string());
        }
    }

    (!properties.is_empty()).then(|| object(properties, required))
}
