//! Plugin definitions and the catalog they are looked up in.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::{Map, Value};

use super::resolver::InferenceContext;
use crate::error::ResolveError;

/// Hook run once per resolution to infer extra dependencies or adjust the
/// merged config.
pub type InferenceHook =
    Arc<dyn Fn(&mut InferenceContext<'_>) -> Result<(), ResolveError> + Send + Sync>;

/// A generator unit as the resolver sees it.
#[derive(Clone, Default)]
pub struct PluginDefinition {
    /// Unique plugin name, e.g. `@specgen/sdk`.
    pub name: String,
    /// Default configuration; user patches are merged over it.
    pub config: Map<String, Value>,
    /// Plugins that must run first, in declaration order.
    pub dependencies: Vec<String>,
    /// Capability tags other plugins can look this one up by.
    pub tags: BTreeSet<String>,
    /// Optional inference hook.
    pub inference_hook: Option<InferenceHook>,
}

impl PluginDefinition {
    /// A definition with no config, dependencies, tags or hook.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set one default config value.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Add a static dependency; duplicates are ignored.
    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        push_unique(&mut self.dependencies, dependency.into());
        self
    }

    /// Advertise a capability tag.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attach an inference hook.
    pub fn infer<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut InferenceContext<'_>) -> Result<(), ResolveError> + Send + Sync + 'static,
    {
        self.inference_hook = Some(Arc::new(hook));
        self
    }

    /// Whether this plugin advertises `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("dependencies", &self.dependencies)
            .field("tags", &self.tags)
            .field("inference_hook", &self.inference_hook.is_some())
            .finish()
    }
}

/// What a user supplied for a plugin name.
#[derive(Debug, Clone)]
pub enum PluginOverride {
    /// Keys shallow-merged over a built-in plugin's default config.
    Config(Map<String, Value>),
    /// A complete custom plugin.
    Definition(PluginDefinition),
}

/// Built-in definitions plus the user's overrides for one generation request.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    defaults: IndexMap<String, PluginDefinition>,
    overrides: IndexMap<String, PluginOverride>,
}

impl PluginCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog seeded with built-in definitions.
    pub fn with_defaults(defaults: impl IntoIterator<Item = PluginDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in defaults {
            catalog.register_default(definition);
        }
        catalog
    }

    /// Add or replace a built-in definition.
    pub fn register_default(&mut self, definition: PluginDefinition) {
        self.defaults.insert(definition.name.clone(), definition);
    }

    /// Merge config keys over whatever is already overridden for `name`.
    pub fn override_config(&mut self, name: impl Into<String>, patch: Map<String, Value>) {
        match self.overrides.entry(name.into()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                PluginOverride::Config(config) => config.extend(patch),
                PluginOverride::Definition(definition) => definition.config.extend(patch),
            },
            Entry::Vacant(entry) => {
                entry.insert(PluginOverride::Config(patch));
            }
        }
    }

    /// Register a user-authored plugin. Built-in names cannot be replaced.
    pub fn register_custom(&mut self, definition: PluginDefinition) -> Result<(), ResolveError> {
        if self.defaults.contains_key(&definition.name) {
            return Err(ResolveError::NativeOverride {
                name: definition.name,
            });
        }
        self.overrides
            .insert(definition.name.clone(), PluginOverride::Definition(definition));
        Ok(())
    }

    /// Whether `name` resolves to anything.
    pub fn contains(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
            || matches!(self.overrides.get(name), Some(PluginOverride::Definition(_)))
    }

    /// Built-in names followed by custom names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str).chain(
            self.overrides
                .iter()
                .filter(|(_, entry)| matches!(entry, PluginOverride::Definition(_)))
                .map(|(name, _)| name.as_str()),
        )
    }

    /// The tags `name` advertises before any merging; built-ins take
    /// precedence over custom definitions.
    pub(super) fn tags_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        if let Some(definition) = self.defaults.get(name) {
            return Some(&definition.tags);
        }
        match self.overrides.get(name) {
            Some(PluginOverride::Definition(definition)) => Some(&definition.tags),
            _ => None,
        }
    }

    /// The effective definition for `name`: the built-in one with the user's
    /// config patch applied, or the custom definition.
    ///
    /// A config patch for a name with no built-in definition resolves to
    /// nothing.
    pub fn definition(&self, name: &str) -> Option<PluginDefinition> {
        let overridden = self.overrides.get(name);
        match (self.defaults.get(name), overridden) {
            (Some(default), None) => Some(default.clone()),
            (Some(default), Some(PluginOverride::Config(patch))) => {
                let mut merged = default.clone();
                merged
                    .config
                    .extend(patch.iter().map(|(key, value)| (key.clone(), value.clone())));
                Some(merged)
            }
            (_, Some(PluginOverride::Definition(custom))) => Some(custom.clone()),
            (None, _) => None,
        }
    }
}

pub(super) fn push_unique(list: &mut Vec<String>, value: String) -> bool {
    if list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_config_patch_is_shallow_merged() {
        let mut catalog = PluginCatalog::with_defaults([PluginDefinition::new("@specgen/typescript")
            .with_config("enums", false)
            .with_config("exportFromIndex", true)]);
        catalog.override_config("@specgen/typescript", patch(json!({ "enums": "javascript" })));

        let merged = catalog.definition("@specgen/typescript").unwrap();
        assert_eq!(merged.config["enums"], json!("javascript"));
        assert_eq!(merged.config["exportFromIndex"], json!(true));
    }

    #[test]
    fn test_repeated_patches_accumulate() {
        let mut catalog = PluginCatalog::with_defaults([PluginDefinition::new("a")]);
        catalog.override_config("a", patch(json!({ "x": 1 })));
        catalog.override_config("a", patch(json!({ "y": 2 })));
        let merged = catalog.definition("a").unwrap();
        assert_eq!(merged.config.len(), 2);
    }

    #[test]
    fn test_custom_definition_cannot_replace_builtin() {
        let mut catalog = PluginCatalog::with_defaults([PluginDefinition::new("@specgen/sdk")]);
        let err = catalog
            .register_custom(PluginDefinition::new("@specgen/sdk"))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::NativeOverride {
                name: "@specgen/sdk".into()
            }
        );
    }

    #[test]
    fn test_patch_without_definition_is_unknown() {
        let mut catalog = PluginCatalog::new();
        catalog.override_config("my-plugin", Map::new());
        assert!(catalog.definition("my-plugin").is_none());
        assert!(!catalog.contains("my-plugin"));
    }

    #[test]
    fn test_names_and_tags() {
        let mut catalog =
            PluginCatalog::with_defaults([PluginDefinition::new("a").tagged("client")]);
        catalog
            .register_custom(PluginDefinition::new("b").depends_on("a").depends_on("a"))
            .unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(catalog.tags_of("a").unwrap().contains("client"));
        assert_eq!(catalog.definition("b").unwrap().dependencies, vec!["a"]);
    }
}
