//! End-to-end behaviour of the registry, resolver and scheduler through the
//! public API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;

use specgen_core::naming::{CaseStyle, Identifier, IdentifierRegistry, IdentifierRequest, Namespace};
use specgen_core::plugins::{PluginCatalog, PluginDefinition, TagLookup, resolve};
use specgen_core::schedule::MinHeap;
use specgen_core::{GenerationContext, ResolveError, WalkOptions};

fn request(reference: &str, namespace: Namespace) -> IdentifierRequest<'_> {
    IdentifierRequest::new(reference, namespace).create(true)
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[test]
fn test_scenario_a_default_pascal_and_idempotent() {
    let mut registry = IdentifierRegistry::new();
    let first = registry
        .ensure_unique_identifier(request("#/components/User", Namespace::Type))
        .unwrap();
    assert_eq!(
        first,
        Identifier {
            created: true,
            name: "User".into()
        }
    );

    let second = registry
        .ensure_unique_identifier(request("#/components/User", Namespace::Type))
        .unwrap();
    assert_eq!(
        second,
        Identifier {
            created: false,
            name: "User".into()
        }
    );
}

#[test]
fn test_scenario_b_folded_collision_gets_suffix() {
    let mut registry = IdentifierRegistry::new();
    let lower = |_: &str| String::from("user");
    let other = registry
        .ensure_unique_identifier(
            request("#/components/Other", Namespace::Type)
                .case(CaseStyle::Camel)
                .transform(&lower),
        )
        .unwrap();
    assert_eq!(other.name, "user");

    let user = registry
        .ensure_unique_identifier(request("#/components/User", Namespace::Type).case(CaseStyle::Camel))
        .unwrap();
    assert_eq!(
        user,
        Identifier {
            created: true,
            name: "user2".into()
        }
    );
}

#[test]
fn test_scenario_c_transitive_dependencies() {
    let catalog = PluginCatalog::with_defaults([
        PluginDefinition::new("A").depends_on("B"),
        PluginDefinition::new("B").depends_on("C"),
        PluginDefinition::new("C"),
    ]);
    let resolution = resolve(&names(&["A"]), &catalog).unwrap();
    assert_eq!(resolution.order, vec!["C", "B", "A"]);
    assert_eq!(
        resolution.resolved.keys().collect::<Vec<_>>(),
        vec!["C", "B", "A"]
    );
}

#[test]
fn test_scenario_d_heap_pops_by_index() {
    let index = HashMap::from([("a", 10_u64), ("b", 5), ("c", 20)]);
    let mut heap = MinHeap::new(index);
    for id in ["a", "b", "c"] {
        heap.push(id);
    }
    let popped: Vec<&str> = std::iter::from_fn(|| heap.pop()).collect();
    assert_eq!(popped, vec!["b", "a", "c"]);
    assert!(heap.is_empty());
}

#[test]
fn test_property_accessor_derivation() {
    let mut registry = IdentifierRegistry::new();
    registry
        .ensure_unique_identifier(request("#/components/schemas/User", Namespace::Type))
        .unwrap();
    let accessor = registry
        .ensure_unique_identifier(request(
            "#/components/schemas/User/properties/name",
            Namespace::Type,
        ))
        .unwrap();
    assert_eq!(accessor.name, "User['name']");
    assert!(!accessor.created);

    let nested = registry
        .ensure_unique_identifier(request(
            "#/components/schemas/User/properties/address/properties/city",
            Namespace::Type,
        ))
        .unwrap();
    assert_eq!(nested.name, "User['address']['city']");
}

#[test]
fn test_distinct_references_never_share_a_name_across_namespaces() {
    let mut registry = IdentifierRegistry::new();
    let mut seen = Vec::new();
    for (reference, namespace) in [
        ("#/components/schemas/Pet", Namespace::Type),
        ("#/components/responses/pet", Namespace::Enum),
        ("#/definitions/PET", Namespace::Value),
        ("#/components/schemas/Pet", Namespace::Enum),
    ] {
        let identifier = registry
            .ensure_unique_identifier(request(reference, namespace).case(CaseStyle::Pascal))
            .unwrap();
        assert!(identifier.created);
        seen.push(identifier.name);
    }
    assert_eq!(seen, vec!["Pet", "Pet2", "Pet3", "Pet4"]);
}

#[test]
fn test_invalid_reference_is_the_only_naming_error() {
    let mut registry = IdentifierRegistry::new();
    let err = registry
        .ensure_unique_identifier(request(
            "#/components/schemas/User/properties/",
            Namespace::Type,
        ))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid reference: #/components/schemas/User/properties/"
    );
}

#[test]
fn test_cycle_names_a_participant() {
    let catalog = PluginCatalog::with_defaults([
        PluginDefinition::new("entry").depends_on("A"),
        PluginDefinition::new("A").depends_on("B"),
        PluginDefinition::new("B").depends_on("A"),
    ]);
    let err = resolve(&names(&["entry"]), &catalog).unwrap_err();
    let ResolveError::CircularDependency { name } = &err else {
        panic!("expected a circular dependency, got {err:?}");
    };
    assert!(name == "A" || name == "B");
}

#[test]
fn test_inferred_client_dependency() {
    let catalog = PluginCatalog::with_defaults([
        PluginDefinition::new("@specgen/typescript"),
        PluginDefinition::new("@specgen/client-fetch").tagged("client"),
        PluginDefinition::new("@specgen/sdk")
            .depends_on("@specgen/typescript")
            .infer(|context| {
                let client = context
                    .plugin_by_tag(TagLookup::new("client").fallback("@specgen/client-fetch"))?;
                context.ensure_dependency(&client);
                Ok(())
            }),
    ]);
    let resolution = resolve(&names(&["@specgen/sdk"]), &catalog).unwrap();
    assert_eq!(
        resolution.order,
        vec![
            "@specgen/typescript",
            "@specgen/client-fetch",
            "@specgen/sdk"
        ]
    );
}

#[test]
fn test_context_threads_one_registry_through_plugins() {
    let mut context = GenerationContext::new();
    let reference = "#/components/schemas/Status";

    let ty = context
        .identifier(request(reference, Namespace::Type))
        .unwrap();
    context.declare(
        "type:Status",
        "@specgen/typescript",
        format!("export type {} = 'on' | 'off';", ty.name),
        ["enum:Status"],
    );
    let en = context
        .identifier(request(reference, Namespace::Enum))
        .unwrap();
    context.declare(
        "enum:Status",
        "@specgen/typescript",
        format!("export const {} = {{ ON: 'on', OFF: 'off' }} as const;", en.name),
        Vec::<String>::new(),
    );

    let rendered = context.render(&WalkOptions::new()).unwrap();
    assert_eq!(
        rendered,
        "export const Status2 = { ON: 'on', OFF: 'off' } as const;\n\nexport type Status = 'on' | 'off';"
    );
}
