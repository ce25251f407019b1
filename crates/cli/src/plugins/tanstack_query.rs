//! `@specgen/tanstack-query`: query options for reads, mutation options for
//! everything else, wrapping the SDK functions.

use specgen_core::PluginDefinition;
use specgen_core::naming::{CaseStyle, IdentifierRequest, Namespace};
use specgen_core::plugins::TagLookup;
use tracing::warn;

use super::ts::{escape_string, safe_identifier};
use super::{CLIENT_FETCH, CLIENT_TAG, Plugin, PluginRun, SDK, TANSTACK_QUERY, declaration_id};

/// TanStack Query helpers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TanstackQuery;

impl Plugin for TanstackQuery {
    fn name(&self) -> &'static str {
        TANSTACK_QUERY
    }

    fn definition(&self) -> PluginDefinition {
        PluginDefinition::new(TANSTACK_QUERY)
            .depends_on(SDK)
            .infer(|context| {
                let client =
                    context.plugin_by_tag(TagLookup::new(CLIENT_TAG).fallback(CLIENT_FETCH))?;
                context.ensure_dependency(&client);
                Ok(())
            })
    }

    fn generate(&self, run: &mut PluginRun<'_>) -> Result<(), String> {
        for operation in run.document.operations() {
            let Some(function) = run.existing_name(&operation.reference, Namespace::Value) else {
                warn!(
                    reference = %operation.reference,
                    "No SDK function for operation, skipping query helper."
                );
                continue;
            };
            let is_query = operation.method == "get";
            let suffix = if is_query { "Options" } else { "Mutation" };
            let helper_ref = format!("{}/{}", operation.reference, suffix.to_ascii_lowercase());
            let rename = |_: &str| format!("{function}{suffix}");
            let name = run.name(
                IdentifierRequest::new(&helper_ref, Namespace::Value)
                    .case(CaseStyle::Camel)
                    .transform(&rename),
            )?;

            let function = safe_identifier(&function);
            let text = if is_query {
                format!(
                    "export const {name} = (options: Parameters<typeof {function}>[0]) => ({{\n    queryKey: ['{}', options] as const,\n    queryFn: () => {function}(options),\n}});",
                    escape_string(&function)
                )
            } else {
                format!(
                    "export const {name} = () => ({{\n    mutationFn: (options: Parameters<typeof {function}>[0]) => {function}(options),\n}});"
                )
            };
            run.declare(
                declaration_id(Namespace::Value, &helper_ref),
                text,
                [declaration_id(Namespace::Value, &operation.reference)],
            );
        }
        Ok(())
    }
}
