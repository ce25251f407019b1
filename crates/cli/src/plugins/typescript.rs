//! `@specgen/typescript`: a type alias per component schema and, when
//! `enums = "javascript"`, a const object per enum schema.

use serde_json::Value;
use specgen_core::PluginDefinition;
use specgen_core::naming::{IdentifierRequest, Namespace};
use tracing::{debug, warn};

use super::ts::{TypePrinter, doc_comment, enum_key, literal};
use super::{Plugin, PluginRun, TYPESCRIPT, declaration_id, naming_failed};
use crate::spec::SchemaEntry;

/// Type declarations for every component schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumMode {
    Union,
    Javascript,
}

impl EnumMode {
    fn from_config(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(mode)) if mode == "javascript" => Self::Javascript,
            Some(Value::String(mode)) => {
                warn!(mode = %mode, "Unsupported enums mode, emitting union types.");
                Self::Union
            }
            _ => Self::Union,
        }
    }
}

impl Plugin for TypeScript {
    fn name(&self) -> &'static str {
        TYPESCRIPT
    }

    fn definition(&self) -> PluginDefinition {
        PluginDefinition::new(TYPESCRIPT).with_config("enums", false)
    }

    fn generate(&self, run: &mut PluginRun<'_>) -> Result<(), String> {
        let mode = EnumMode::from_config(run.record.config.get("enums"));
        let schemas = run.document.schemas();
        debug!(count = schemas.len(), "Generating type declarations.");

        for entry in &schemas {
            let name =
                run.name(IdentifierRequest::new(&entry.reference, Namespace::Type).case(run.case))?;
            let doc = doc_comment(entry.schema.description.as_deref(), "");
            let id = declaration_id(Namespace::Type, &entry.reference);

            match (&entry.schema.enum_values, mode) {
                (Some(values), EnumMode::Javascript) => {
                    let enum_name = declare_enum(run, entry, values)?;
                    let text = format!(
                        "{doc}export type {name} = (typeof {enum_name})[keyof typeof {enum_name}];"
                    );
                    run.declare(id, text, [declaration_id(Namespace::Enum, &entry.reference)]);
                }
                _ => {
                    let printed = TypePrinter::new(&mut *run.context)
                        .inline_from(run.document)
                        .print(&entry.schema)
                        .map_err(|err| naming_failed(&err))?;
                    let dependencies: Vec<String> = printed
                        .references
                        .iter()
                        .map(|reference| declaration_id(Namespace::Type, reference))
                        .collect();
                    let text = format!("{doc}export type {name} = {};", printed.text);
                    run.declare(id, text, dependencies);
                }
            }
        }
        Ok(())
    }
}

fn declare_enum(
    run: &mut PluginRun<'_>,
    entry: &SchemaEntry,
    values: &[Value],
) -> Result<String, String> {
    let name = run.name(IdentifierRequest::new(&entry.reference, Namespace::Enum).case(run.case))?;
    let members: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(index, value)| format!("    {}: {},", enum_key(value, index), literal(value)))
        .collect();
    let text = format!(
        "{}export const {name} = {{\n{}\n}} as const;",
        doc_comment(entry.schema.description.as_deref(), ""),
        members.join("\n")
    );
    run.declare(
        declaration_id(Namespace::Enum, &entry.reference),
        text,
        Vec::<String>::new(),
    );
    Ok(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::{Map, json};
    use specgen_core::naming::CaseStyle;

    use super::*;
    use crate::driver::render_document;
    use crate::plugins::{builtin_catalog, builtin_plugins};
    use crate::spec::OpenApiDocument;

    const DOCUMENT: &str = r##"
openapi: 3.0.3
paths: {}
components:
  schemas:
    Owner:
      type: object
      properties:
        pet: { $ref: "#/components/schemas/Pet" }
    Pet:
      description: A pet.
      type: object
      required: [name]
      properties:
        name: { type: string }
        status: { $ref: "#/components/schemas/Status" }
    Status:
      type: string
      enum: [available, sold]
"##;

    fn render(enums: Value) -> String {
        let document = OpenApiDocument::parse(DOCUMENT, false).unwrap();
        let plugins = builtin_plugins();
        let mut catalog = builtin_catalog(&plugins);
        let mut patch = Map::new();
        patch.insert("enums".to_string(), enums);
        catalog.override_config(TYPESCRIPT, patch);
        render_document(
            &document,
            &[TYPESCRIPT.to_string()],
            &catalog,
            &plugins,
            CaseStyle::Pascal,
        )
        .unwrap()
    }

    #[test]
    fn test_referenced_types_come_first() {
        let output = render(json!(false));
        let status = output.find("export type Status =").unwrap();
        let pet = output.find("export type Pet =").unwrap();
        let owner = output.find("export type Owner =").unwrap();
        assert!(status < pet && pet < owner, "{output}");
        assert!(output.contains("export type Status = 'available' | 'sold';"));
        assert!(output.contains("/**\n * A pet.\n */\nexport type Pet = {\n    name: string;\n    status?: Status;\n};"));
    }

    #[test]
    fn test_javascript_enums_share_the_name_space() {
        let output = render(json!("javascript"));
        assert!(
            output.contains("export const Status2 = {\n    AVAILABLE: 'available',\n    SOLD: 'sold',\n} as const;"),
            "{output}"
        );
        assert!(output.contains("export type Status = (typeof Status2)[keyof typeof Status2];"));
        assert!(output.find("export const Status2").unwrap() < output.find("export type Status =").unwrap());
    }
}
