//! Built-in plugins.
//!
//! Each plugin contributes a [`PluginDefinition`] to the resolver and a
//! generator that declares source text into the run's
//! [`GenerationContext`]. Generators never name each other's output
//! directly: they go through the registry, by reference and namespace.

mod client;
mod schemas;
mod sdk;
mod tanstack_query;
pub mod ts;
mod typescript;

use std::fmt;

use serde_json::Value;
use specgen_core::naming::{CaseStyle, IdentifierRequest, Namespace};
use specgen_core::plugins::PluginRecord;
use specgen_core::{GenerationContext, NamingError, PluginCatalog, PluginDefinition};

use crate::spec::OpenApiDocument;

pub use client::{AxiosClient, FetchClient};
pub use schemas::JsonSchemas;
pub use sdk::Sdk;
pub use tanstack_query::TanstackQuery;
pub use typescript::TypeScript;

/// Type declarations.
pub const TYPESCRIPT: &str = "@specgen/typescript";
/// JSON-schema constants.
pub const SCHEMAS: &str = "@specgen/schemas";
/// `fetch`-based client.
pub const CLIENT_FETCH: &str = "@specgen/client-fetch";
/// `axios`-based client.
pub const CLIENT_AXIOS: &str = "@specgen/client-axios";
/// Operation functions.
pub const SDK: &str = "@specgen/sdk";
/// TanStack Query helpers.
pub const TANSTACK_QUERY: &str = "@specgen/tanstack-query";

/// Capability tag advertised by HTTP client plugins.
pub const CLIENT_TAG: &str = "client";
/// Name prefix shared by the built-in client plugins.
pub const CLIENT_PREFIX: &str = "@specgen/client";
/// Plugins generated when a job lists none.
pub const DEFAULT_PLUGINS: [&str; 2] = [TYPESCRIPT, SDK];

/// Synthetic reference the client instance is named under.
pub(crate) const CLIENT_REF: &str = "#/specgen/client";

/// A built-in generator.
pub trait Plugin: fmt::Debug + Send + Sync {
    /// Name the plugin is requested by.
    fn name(&self) -> &'static str;

    /// Definition handed to the resolver.
    fn definition(&self) -> PluginDefinition;

    /// Declare this plugin's output into the run's context.
    fn generate(&self, run: &mut PluginRun<'_>) -> Result<(), String>;
}

/// Everything a generator sees while it runs.
#[derive(Debug)]
pub struct PluginRun<'a> {
    /// Parsed input document.
    pub document: &'a OpenApiDocument,
    /// The plugin's resolved record (merged config included).
    pub record: &'a PluginRecord,
    /// Per-job naming and declaration state.
    pub context: &'a mut GenerationContext,
    /// Case style for type and enum names.
    pub case: CaseStyle,
}

impl PluginRun<'_> {
    /// A string config value.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.record.config.get(key).and_then(Value::as_str)
    }

    /// Allocate (or fetch) the name for `request`.
    pub fn name(&mut self, request: IdentifierRequest<'_>) -> Result<String, String> {
        let identifier = self
            .context
            .identifier(request.create(true))
            .map_err(|err| naming_failed(&err))?;
        if identifier.is_empty() {
            return Err(format!(
                "Failed to name declaration: '{}' has no entity name",
                request.reference()
            ));
        }
        Ok(identifier.name)
    }

    /// The name `reference` already holds in `namespace`, if any.
    pub fn existing_name(&self, reference: &str, namespace: Namespace) -> Option<String> {
        self.context.registry().get(reference, namespace)
    }

    /// Declare `text` as owned by this plugin.
    pub fn declare<I, S>(&mut self, id: String, text: String, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let plugin = self.record.name.clone();
        self.context.declare(id, plugin, text, dependencies);
    }
}

pub(crate) fn naming_failed(err: &NamingError) -> String {
    format!("Failed to name declaration: {err}")
}

/// Declaration id for the output generated from `reference` in `namespace`.
pub fn declaration_id(namespace: Namespace, reference: &str) -> String {
    format!("{namespace}:{reference}")
}

/// Declaration id for an import statement.
pub fn import_id(module: &str) -> String {
    format!("import:{module}")
}

/// Emission priority: imports first, everything else at the default.
pub fn emission_priority(id: &str) -> Option<u64> {
    id.starts_with("import:").then_some(0)
}

/// Every built-in plugin, in catalog order.
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(TypeScript),
        Box::new(JsonSchemas),
        Box::new(FetchClient),
        Box::new(AxiosClient),
        Box::new(Sdk),
        Box::new(TanstackQuery),
    ]
}

/// A catalog seeded with every built-in definition.
pub fn builtin_catalog(plugins: &[Box<dyn Plugin>]) -> PluginCatalog {
    PluginCatalog::with_defaults(plugins.iter().map(|plugin| plugin.definition()))
}

/// Look up a built-in generator by name.
pub fn find<'a>(plugins: &'a [Box<dyn Plugin>], name: &str) -> Option<&'a dyn Plugin> {
    plugins
        .iter()
        .find(|plugin| plugin.name() == name)
        .map(|plugin| plugin.as_ref())
}
