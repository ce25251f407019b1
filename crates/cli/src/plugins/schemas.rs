//! `@specgen/schemas`: each component schema as a JSON constant.

use specgen_core::PluginDefinition;
use specgen_core::naming::{CaseStyle, IdentifierRequest, Namespace};

use super::{Plugin, PluginRun, SCHEMAS, TYPESCRIPT, declaration_id};

/// `export const PetSchema = { ... } as const;` for every schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemas;

impl Plugin for JsonSchemas {
    fn name(&self) -> &'static str {
        SCHEMAS
    }

    fn definition(&self) -> PluginDefinition {
        PluginDefinition::new(SCHEMAS)
            .with_config("nameSuffix", "Schema")
            .depends_on(TYPESCRIPT)
    }

    fn generate(&self, run: &mut PluginRun<'_>) -> Result<(), String> {
        let suffix = run.config_str("nameSuffix").unwrap_or("Schema").to_string();
        let add_suffix = |name: &str| format!("{name}{suffix}");

        for entry in run.document.schemas() {
            let name = run.name(
                IdentifierRequest::new(&entry.reference, Namespace::Value)
                    .case(CaseStyle::Pascal)
                    .transform(&add_suffix),
            )?;
            let json = serde_json::to_string_pretty(&entry.schema)
                .map_err(|err| format!("Failed to serialize schema {}: {err}", entry.name))?;
            run.declare(
                declaration_id(Namespace::Value, &entry.reference),
                format!("export const {name} = {json} as const;"),
                Vec::<String>::new(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::render_document;
    use crate::plugins::{builtin_catalog, builtin_plugins};
    use crate::spec::OpenApiDocument;

    #[test]
    fn test_schema_constants_do_not_collide_with_types() {
        let document = OpenApiDocument::parse(
            r##"{
                "openapi": "3.1.0",
                "components": { "schemas": {
                    "Pet": { "type": "object", "properties": { "id": { "type": "integer" } } },
                    "PetSchema": { "type": "string" }
                } }
            }"##,
            true,
        )
        .unwrap();
        let plugins = builtin_plugins();
        let output = render_document(
            &document,
            &[SCHEMAS.to_string()],
            &builtin_catalog(&plugins),
            &plugins,
            CaseStyle::Pascal,
        )
        .unwrap();

        assert!(output.contains("export type Pet = {"), "{output}");
        assert!(output.contains("export type PetSchema = string;"));
        // `PetSchema` is taken by the type, so the constant for `Pet` is
        // suffixed, and the one for `PetSchema` gets its own name.
        assert!(output.contains("export const PetSchema2 = {\n  \"type\": \"object\""), "{output}");
        assert!(output.contains("export const PetSchemaSchema = {\n  \"type\": \"string\"\n} as const;"));
    }
}
