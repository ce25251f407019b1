//! Depth-first plugin ordering.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::definition::{PluginCatalog, push_unique};
use crate::error::ResolveError;

/// A plugin after merging and inference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginRecord {
    /// Plugin name.
    pub name: String,
    /// Default config with user patches and hook edits applied.
    pub config: Map<String, Value>,
    /// Static dependencies followed by inferred ones.
    pub dependencies: Vec<String>,
    /// Advertised capability tags.
    pub tags: BTreeSet<String>,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    /// Execution order; every plugin follows its dependencies.
    pub order: Vec<String>,
    /// Records keyed by name, in execution order.
    pub resolved: IndexMap<String, PluginRecord>,
}

/// Parameters for [`InferenceContext::plugin_by_tag`].
#[derive(Debug, Clone, Copy)]
pub struct TagLookup<'a> {
    tag: &'a str,
    exclude_self: bool,
    fallback: Option<&'a str>,
    error_message: Option<&'a str>,
}

impl<'a> TagLookup<'a> {
    /// Look up `tag`, skipping the calling plugin.
    pub fn new(tag: &'a str) -> Self {
        Self {
            tag,
            exclude_self: true,
            fallback: None,
            error_message: None,
        }
    }

    /// Allow the calling plugin itself to match.
    pub fn include_self(mut self) -> Self {
        self.exclude_self = false;
        self
    }

    /// Plugin to check when no requested plugin carries the tag.
    pub fn fallback(mut self, name: &'a str) -> Self {
        self.fallback = Some(name);
        self
    }

    /// Message to fail with instead of the default one.
    pub fn error_message(mut self, message: &'a str) -> Self {
        self.error_message = Some(message);
        self
    }
}

/// Capabilities handed to an inference hook.
#[derive(Debug)]
pub struct InferenceContext<'a> {
    name: &'a str,
    requested: &'a [String],
    catalog: &'a PluginCatalog,
    config: &'a mut Map<String, Value>,
    dependencies: &'a mut Vec<String>,
}

impl InferenceContext<'_> {
    /// Name of the plugin being resolved.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The plugin's merged config.
    pub fn config(&self) -> &Map<String, Value> {
        &*self.config
    }

    /// Mutable access to the plugin's merged config.
    pub fn config_mut(&mut self) -> &mut Map<String, Value> {
        &mut *self.config
    }

    /// Dependencies known so far.
    pub fn dependencies(&self) -> &[String] {
        self.dependencies.as_slice()
    }

    /// Append a dependency unless it is already listed.
    pub fn ensure_dependency(&mut self, dependency: &str) {
        if push_unique(self.dependencies, dependency.to_string()) {
            trace!(plugin = %self.name, dependency, "Inferred plugin dependency.");
        }
    }

    /// Find the first requested plugin advertising a tag, then the fallback.
    pub fn plugin_by_tag(&self, lookup: TagLookup<'_>) -> Result<String, ResolveError> {
        let candidates = self
            .requested
            .iter()
            .map(String::as_str)
            .chain(lookup.fallback);
        for candidate in candidates {
            if lookup.exclude_self && candidate == self.name {
                continue;
            }
            if self
                .catalog
                .tags_of(candidate)
                .is_some_and(|tags| tags.contains(lookup.tag))
            {
                return Ok(candidate.to_string());
            }
        }
        Err(match lookup.error_message {
            Some(message) => ResolveError::MissingTag {
                tag: lookup.tag.to_string(),
                message: message.to_string(),
            },
            None => ResolveError::missing_tag(lookup.tag),
        })
    }
}

/// Order `requested` and everything it depends on.
///
/// The order depends only on the request order and on each definition's
/// dependency lists, never on catalog iteration order.
pub fn resolve(requested: &[String], catalog: &PluginCatalog) -> Result<Resolution, ResolveError> {
    let mut resolver = Resolver {
        requested,
        catalog,
        in_progress: HashSet::new(),
        finalized: IndexMap::new(),
    };
    for name in requested {
        resolver.visit(name)?;
    }

    let order: Vec<String> = resolver.finalized.keys().cloned().collect();
    debug!(order = ?order, "Resolved plugin order.");
    Ok(Resolution {
        order,
        resolved: resolver.finalized,
    })
}

struct Resolver<'a> {
    requested: &'a [String],
    catalog: &'a PluginCatalog,
    in_progress: HashSet<String>,
    finalized: IndexMap<String, PluginRecord>,
}

impl Resolver<'_> {
    fn visit(&mut self, name: &str) -> Result<(), ResolveError> {
        if self.in_progress.contains(name) {
            return Err(ResolveError::CircularDependency {
                name: name.to_string(),
            });
        }
        if self.finalized.contains_key(name) {
            return Ok(());
        }
        self.in_progress.insert(name.to_string());

        let definition =
            self.catalog
                .definition(name)
                .ok_or_else(|| ResolveError::UnknownPlugin {
                    name: name.to_string(),
                })?;
        let mut config = definition.config;
        let mut dependencies = definition.dependencies;

        if let Some(hook) = &definition.inference_hook {
            let mut context = InferenceContext {
                name,
                requested: self.requested,
                catalog: self.catalog,
                config: &mut config,
                dependencies: &mut dependencies,
            };
            hook(&mut context)?;
        }

        for dependency in &dependencies {
            self.visit(dependency)?;
        }

        self.in_progress.remove(name);
        self.finalized.insert(
            name.to_string(),
            PluginRecord {
                name: name.to_string(),
                config,
                dependencies,
                tags: definition.tags,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::plugins::PluginDefinition;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn test_unknown_requested_plugin() {
        let err = resolve(&names(&["nope"]), &PluginCatalog::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown plugin dependency \"nope\" - do you need to register a custom plugin with this name?"
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let catalog = PluginCatalog::with_defaults([PluginDefinition::new("a").depends_on("ghost")]);
        let err = resolve(&names(&["a"]), &catalog).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownPlugin {
                name: "ghost".into()
            }
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let catalog = PluginCatalog::with_defaults([PluginDefinition::new("a").depends_on("a")]);
        let err = resolve(&names(&["a"]), &catalog).unwrap_err();
        assert_eq!(err.to_string(), "Circular reference detected at 'a'");
    }

    #[test]
    fn test_shared_dependency_visited_once() {
        let catalog = PluginCatalog::with_defaults([
            PluginDefinition::new("a").depends_on("c"),
            PluginDefinition::new("b").depends_on("c"),
            PluginDefinition::new("c"),
        ]);
        let resolution = resolve(&names(&["a", "b"]), &catalog).unwrap();
        assert_eq!(resolution.order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_hook_runs_once_and_infers_dependency() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let catalog = PluginCatalog::with_defaults([
            PluginDefinition::new("client").tagged("client"),
            PluginDefinition::new("sdk").infer(move |context| {
                seen.fetch_add(1, Ordering::SeqCst);
                let client = context.plugin_by_tag(TagLookup::new("client"))?;
                context
                    .config_mut()
                    .insert("client".into(), Value::String(client.clone()));
                context.ensure_dependency(&client);
                context.ensure_dependency(&client);
                Ok(())
            }),
        ]);
        let resolution = resolve(&names(&["sdk", "client", "sdk"]), &catalog).unwrap();
        assert_eq!(resolution.order, vec!["client", "sdk"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let sdk = &resolution.resolved["sdk"];
        assert_eq!(sdk.dependencies, vec!["client"]);
        assert_eq!(sdk.config["client"], json!("client"));
    }

    #[test]
    fn test_plugin_by_tag_prefers_request_order() {
        let catalog = PluginCatalog::with_defaults([
            PluginDefinition::new("fetch").tagged("client"),
            PluginDefinition::new("axios").tagged("client"),
            PluginDefinition::new("sdk").infer(|context| {
                let client = context.plugin_by_tag(TagLookup::new("client").fallback("fetch"))?;
                context.ensure_dependency(&client);
                Ok(())
            }),
        ]);
        let resolution = resolve(&names(&["sdk", "axios"]), &catalog).unwrap();
        assert_eq!(resolution.resolved["sdk"].dependencies, vec!["axios"]);

        let resolution = resolve(&names(&["sdk"]), &catalog).unwrap();
        assert_eq!(resolution.order, vec!["fetch", "sdk"]);
    }

    #[test]
    fn test_plugin_by_tag_excludes_self() {
        let catalog = PluginCatalog::with_defaults([PluginDefinition::new("solo")
            .tagged("client")
            .infer(|context| {
                context.plugin_by_tag(TagLookup::new("client"))?;
                Ok(())
            })]);
        let err = resolve(&names(&["solo"]), &catalog).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing plugin - no plugin with tag \"client\" found"
        );
    }

    #[test]
    fn test_plugin_by_tag_untagged_fallback_fails() {
        let catalog = PluginCatalog::with_defaults([
            PluginDefinition::new("plain"),
            PluginDefinition::new("sdk").infer(|context| {
                let client = context.plugin_by_tag(TagLookup::new("client").fallback("plain"))?;
                context.ensure_dependency(&client);
                Ok(())
            }),
        ]);
        let err = resolve(&names(&["sdk"]), &catalog).unwrap_err();
        assert!(matches!(
            &err,
            ResolveError::MissingTag { tag, .. } if tag == "client"
        ));
    }

    #[test]
    fn test_plugin_by_tag_custom_message() {
        let catalog = PluginCatalog::with_defaults([PluginDefinition::new("query").infer(|context| {
            context.plugin_by_tag(
                TagLookup::new("validator").error_message("query needs a validator plugin"),
            )?;
            Ok(())
        })]);
        let err = resolve(&names(&["query"]), &catalog).unwrap_err();
        assert!(matches!(
            &err,
            ResolveError::MissingTag { tag, .. } if tag == "validator"
        ));
        assert_eq!(err.to_string(), "query needs a validator plugin");
    }

    #[test]
    fn test_custom_plugins_resolve_with_builtins() {
        let mut catalog =
            PluginCatalog::with_defaults([PluginDefinition::new("@specgen/typescript")]);
        catalog
            .register_custom(PluginDefinition::new("my-plugin").depends_on("@specgen/typescript"))
            .unwrap();
        let resolution = resolve(&names(&["my-plugin"]), &catalog).unwrap();
        assert_eq!(resolution.order, vec!["@specgen/typescript", "my-plugin"]);
    }
}
