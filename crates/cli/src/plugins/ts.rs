//! TypeScript printing helpers shared by the built-in plugins.

use std::collections::HashSet;
use std::sync::LazyLock;

use heck::ToShoutySnakeCase;
use serde_json::Value;
use specgen_core::naming::Namespace;
use specgen_core::refs::{is_top_level_component_ref, parse_ref};
use specgen_core::{GenerationContext, NamingError};
use tracing::warn;

use crate::spec::{AdditionalProperties, OpenApiDocument, Schema};

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Whether a property name has to be quoted in an object type or literal.
pub fn needs_quotes(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first.is_ascii_alphabetic() || first == '_' || first == '$')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape backslashes and single quotes for a single-quoted string literal.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A property key, quoted when it is not a plain identifier.
pub fn property_key(name: &str) -> String {
    if needs_quotes(name) {
        format!("'{}'", escape_string(name))
    } else {
        name.to_string()
    }
}

/// Make a minted name usable as a binding: prefix leading digits and
/// reserved words with `_`.
pub fn safe_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_empty".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) || TS_RESERVED_WORDS.contains(name) {
        return format!("_{name}");
    }
    name.to_string()
}

/// Print a JSON value as a TypeScript literal.
pub fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", escape_string(s)),
        other => other.to_string(),
    }
}

/// Key of an enum member in a generated const object.
pub fn enum_key(value: &Value, index: usize) -> String {
    match value {
        Value::String(s) => {
            let key = s.to_shouty_snake_case();
            if key.is_empty() {
                format!("VALUE_{index}")
            } else {
                property_key(&key)
            }
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            format!("VALUE_{}", n.to_string().replace('-', "MINUS_"))
        }
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Null => "NULL".to_string(),
        _ => format!("VALUE_{index}"),
    }
}

/// Turn a doc string into a `/** ... */` block, or nothing.
pub fn doc_comment(text: Option<&str>, indent: &str) -> String {
    let Some(text) = text.map(str::trim).filter(|text| !text.is_empty()) else {
        return String::new();
    };
    let mut out = format!("{indent}/**\n");
    for line in text.lines() {
        let line = format!("{indent} * {}", line.replace("*/", "*\\/"));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(indent);
    out.push_str(" */\n");
    out
}

/// Whether a `$ref` is printed inline rather than by name.
///
/// Top-level components and property accessors into them are named through
/// the registry; malformed pointers are left to it so the error surfaces.
fn is_inlined(reference: &str) -> bool {
    if is_top_level_component_ref(reference) {
        return false;
    }
    parse_ref(reference).is_ok_and(|parsed| {
        !parsed.is_property_access() || !is_top_level_component_ref(&parsed.reference)
    })
}

/// A printed type plus the `$ref`s it mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeExpr {
    /// TypeScript type expression; `$ref`s appear as placeholder tokens.
    pub text: String,
    /// Referenced pointers, in first-seen order.
    pub references: Vec<String>,
}

/// Prints schemas as TypeScript types, deferring every component `$ref` name
/// through the registry so forward references resolve after all plugins ran.
///
/// Other local `$ref`s (`#/paths/...`, `.../items`) have no name of their own
/// and are printed inline from the attached document.
#[derive(Debug)]
pub struct TypePrinter<'a> {
    context: &'a mut GenerationContext,
    document: Option<&'a OpenApiDocument>,
    references: Vec<String>,
    inlining: Vec<String>,
}

impl<'a> TypePrinter<'a> {
    /// A printer minting placeholders in `context`.
    pub fn new(context: &'a mut GenerationContext) -> Self {
        Self {
            context,
            document: None,
            references: Vec::new(),
            inlining: Vec::new(),
        }
    }

    /// Resolve inlined `$ref`s against `document`.
    pub fn inline_from(mut self, document: &'a OpenApiDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Print `schema`.
    pub fn print(mut self, schema: &Schema) -> Result<TypeExpr, NamingError> {
        let text = self.schema(schema, 0)?;
        Ok(TypeExpr {
            text,
            references: self.references,
        })
    }

    fn schema(&mut self, schema: &Schema, depth: usize) -> Result<String, NamingError> {
        let base = self.non_null(schema, depth)?;
        if schema.is_nullable() && base != "unknown" && base != "null" {
            return Ok(format!("{base} | null"));
        }
        Ok(base)
    }

    fn non_null(&mut self, schema: &Schema, depth: usize) -> Result<String, NamingError> {
        if let Some(reference) = &schema.reference {
            if is_inlined(reference) {
                return self.inline(reference, depth);
            }
            if !self.references.contains(reference) {
                self.references.push(reference.clone());
            }
            return Ok(self
                .context
                .placeholder(reference, Namespace::Type)?
                .to_string());
        }
        if let Some(value) = &schema.const_value {
            return Ok(literal(value));
        }
        if let Some(values) = &schema.enum_values {
            return Ok(join_or(values.iter().map(literal).collect(), " | ", "never"));
        }
        if let Some(members) = schema.one_of.as_ref().or(schema.any_of.as_ref()) {
            return self.members(members, " | ", depth);
        }
        if let Some(members) = &schema.all_of {
            return self.members(members, " & ", depth);
        }

        let names = schema.type_names();
        if names.len() > 1 {
            let parts = names
                .iter()
                .map(|name| self.named_type(name, schema, depth))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(parts.join(" | "));
        }
        match names.first() {
            Some(name) => self.named_type(name, schema, depth),
            None if schema.properties.is_some() || schema.additional_properties.is_some() => {
                self.object(schema, depth)
            }
            None => Ok("unknown".to_string()),
        }
    }

    fn inline(&mut self, reference: &str, depth: usize) -> Result<String, NamingError> {
        if self.inlining.iter().any(|seen| seen == reference) {
            return Ok("unknown".to_string());
        }
        let Some(target) = self
            .document
            .and_then(|document| document.resolve_schema(reference))
        else {
            warn!(reference, "Unresolvable $ref printed as unknown.");
            return Ok("unknown".to_string());
        };
        self.inlining.push(reference.to_string());
        let printed = self.schema(&target, depth);
        self.inlining.pop();
        printed
    }

    fn members(
        &mut self,
        members: &[Schema],
        separator: &str,
        depth: usize,
    ) -> Result<String, NamingError> {
        let parts = members
            .iter()
            .map(|member| {
                let printed = self.schema(member, depth)?;
                let compound = printed.contains(" | ") || printed.contains(" & ");
                Ok(if compound && !printed.starts_with('{') {
                    format!("({printed})")
                } else {
                    printed
                })
            })
            .collect::<Result<Vec<_>, NamingError>>()?;
        Ok(join_or(parts, separator, "unknown"))
    }

    fn named_type(
        &mut self,
        name: &str,
        schema: &Schema,
        depth: usize,
    ) -> Result<String, NamingError> {
        Ok(match name {
            "string" if matches!(schema.format.as_deref(), Some("binary")) => {
                "Blob | File".to_string()
            }
            "string" => "string".to_string(),
            "integer" | "number" => "number".to_string(),
            "boolean" => "boolean".to_string(),
            "null" => "null".to_string(),
            "array" => {
                let item = match &schema.items {
                    Some(items) => self.schema(items, depth)?,
                    None => "unknown".to_string(),
                };
                format!("Array<{item}>")
            }
            "object" => self.object(schema, depth)?,
            _ => "unknown".to_string(),
        })
    }

    fn object(&mut self, schema: &Schema, depth: usize) -> Result<String, NamingError> {
        let indent = "    ".repeat(depth + 1);
        let closing = "    ".repeat(depth);
        let required = schema.required.as_deref().unwrap_or_default();
        let mut lines = Vec::new();

        for (name, property) in schema.properties.iter().flatten() {
            let optional = if required.contains(name) { "" } else { "?" };
            let printed = self.schema(property, depth + 1)?;
            lines.push(format!(
                "{}{indent}{}{optional}: {printed};",
                doc_comment(property.description.as_deref(), &indent),
                property_key(name)
            ));
        }
        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                let printed = self.schema(value, depth + 1)?;
                lines.push(format!("{indent}[key: string]: {printed};"));
            }
            Some(AdditionalProperties::Bool(true)) => {
                lines.push(format!("{indent}[key: string]: unknown;"));
            }
            Some(AdditionalProperties::Bool(false)) | None => {}
        }

        if lines.is_empty() {
            return Ok("Record<string, unknown>".to_string());
        }
        Ok(format!("{{\n{}\n{closing}}}", lines.join("\n")))
    }
}

fn join_or(parts: Vec<String>, separator: &str, empty: &str) -> String {
    if parts.is_empty() {
        empty.to_string()
    } else {
        parts.join(separator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;
    use specgen_core::naming::{CaseStyle, IdentifierRequest};

    use super::*;

    fn schema(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_needs_quotes() {
        assert!(!needs_quotes("foo"));
        assert!(!needs_quotes("_foo"));
        assert!(!needs_quotes("$foo1"));
        assert!(needs_quotes(""));
        assert!(needs_quotes("123foo"));
        assert!(needs_quotes("foo-bar"));
        assert!(needs_quotes("foo bar"));
    }

    #[test]
    fn test_property_key_and_literals() {
        assert_eq!(property_key("foo"), "foo");
        assert_eq!(property_key("x-rate"), "'x-rate'");
        assert_eq!(literal(&json!("it's")), "'it\\'s'");
        assert_eq!(literal(&json!(3)), "3");
        assert_eq!(literal(&json!(null)), "null");
    }

    #[test]
    fn test_safe_identifier() {
        assert_eq!(safe_identifier("delete"), "_delete");
        assert_eq!(safe_identifier("2fa"), "_2fa");
        assert_eq!(safe_identifier("pet"), "pet");
    }

    #[test]
    fn test_enum_key() {
        assert_eq!(enum_key(&json!("in-stock"), 0), "IN_STOCK");
        assert_eq!(enum_key(&json!("---"), 3), "VALUE_3");
        assert_eq!(enum_key(&json!(-2), 0), "VALUE_MINUS_2");
        assert_eq!(enum_key(&json!(1.5), 4), "VALUE_4");
        assert_eq!(enum_key(&json!(true), 0), "TRUE");
        assert_eq!(enum_key(&json!(null), 0), "NULL");
    }

    #[test]
    fn test_doc_comment() {
        assert_eq!(doc_comment(None, ""), "");
        assert_eq!(doc_comment(Some("  "), ""), "");
        assert_eq!(doc_comment(Some("A pet."), "    "), "    /**\n     * A pet.\n     */\n");
    }

    #[test]
    fn test_print_object_with_reference() {
        let mut context = GenerationContext::new();
        let printed = TypePrinter::new(&mut context)
            .print(&schema(json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "integer" },
                    "owner-name": { "type": ["string", "null"] },
                    "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } }
                }
            })))
            .unwrap();
        assert_eq!(printed.references, vec!["#/components/schemas/Tag"]);

        context
            .identifier(
                IdentifierRequest::new("#/components/schemas/Tag", Namespace::Type)
                    .case(CaseStyle::Pascal)
                    .create(true),
            )
            .unwrap();
        let text = context.registry().resolve_placeholders(&printed.text).unwrap();
        assert_eq!(
            text,
            "{\n    id: number;\n    'owner-name'?: string | null;\n    tags?: Array<Tag>;\n}"
        );
    }

    #[test]
    fn test_print_inlines_non_component_references() {
        let document = OpenApiDocument::parse(
            r##"{
                "paths": {
                    "/pets": {
                        "get": { "parameters": [{ "name": "q", "in": "query", "schema": { "type": "integer" } }] }
                    },
                    "/loop": { "get": { "x-self": { "$ref": "#/paths/~1loop/get/x-self" } } }
                },
                "components": {
                    "schemas": {
                        "Pet": { "properties": { "tags": { "type": "array", "items": { "type": "string" } } } }
                    }
                }
            }"##,
            true,
        )
        .unwrap();
        let mut context = GenerationContext::new();
        let printed = TypePrinter::new(&mut context)
            .inline_from(&document)
            .print(&schema(json!({
                "properties": {
                    "a": { "$ref": "#/paths/~1pets/get/parameters/0/schema" },
                    "b": { "$ref": "#/components/schemas/Pet/properties/tags/items" },
                    "c": { "$ref": "#/components/schemas/Pet/properties/tags" },
                    "d": { "$ref": "#/paths/~1nope" },
                    "e": { "$ref": "#/paths/~1loop/get/x-self" }
                }
            })))
            .unwrap();
        assert_eq!(
            printed.references,
            vec!["#/components/schemas/Pet/properties/tags"]
        );

        context
            .identifier(
                IdentifierRequest::new("#/components/schemas/Pet", Namespace::Type)
                    .case(CaseStyle::Pascal)
                    .create(true),
            )
            .unwrap();
        let text = context.registry().resolve_placeholders(&printed.text).unwrap();
        assert_eq!(
            text,
            "{\n    a?: number;\n    b?: string;\n    c?: Pet['tags'];\n    d?: unknown;\n    e?: unknown;\n}"
        );
    }

    #[test]
    fn test_print_unions_and_enums() {
        let mut context = GenerationContext::new();
        let union = TypePrinter::new(&mut context)
            .print(&schema(json!({
                "anyOf": [{ "type": "string" }, { "type": "integer", "nullable": true }]
            })))
            .unwrap();
        assert_eq!(union.text, "string | (number | null)");

        let enumeration = TypePrinter::new(&mut context)
            .print(&schema(json!({ "enum": ["on", "off", 1] })))
            .unwrap();
        assert_eq!(enumeration.text, "'on' | 'off' | 1");

        let map = TypePrinter::new(&mut context)
            .print(&schema(json!({ "type": "object", "additionalProperties": true })))
            .unwrap();
        assert_eq!(map.text, "{\n    [key: string]: unknown;\n}");
    }
}
