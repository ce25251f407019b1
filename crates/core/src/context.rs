//! Per-run generation state.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, warn};

use crate::error::NamingError;
use crate::naming::{Identifier, IdentifierRegistry, IdentifierRequest, Namespace, Placeholder};
use crate::schedule::{DeclarationGraph, MinHeap, WalkOptions, walk_topological};

/// A piece of emitted source owned by one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Unique declaration id, usually the reference it was generated from.
    pub id: String,
    /// Plugin that produced it.
    pub plugin: String,
    /// Source text; may contain placeholder tokens.
    pub text: String,
}

/// Everything one generation request shares between its plugins.
///
/// Build a fresh context per request; nothing in it outlives the run.
#[derive(Debug, Default)]
pub struct GenerationContext {
    registry: IdentifierRegistry,
    declarations: IndexMap<String, Declaration>,
    graph: DeclarationGraph,
    scheduled: Vec<String>,
}

impl GenerationContext {
    /// An empty context with a fresh registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The run's identifier registry.
    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    /// Mutable access to the run's identifier registry.
    pub fn registry_mut(&mut self) -> &mut IdentifierRegistry {
        &mut self.registry
    }

    /// Shorthand for [`IdentifierRegistry::ensure_unique_identifier`].
    pub fn identifier(&mut self, request: IdentifierRequest<'_>) -> Result<Identifier, NamingError> {
        self.registry.ensure_unique_identifier(request)
    }

    /// Shorthand for [`IdentifierRegistry::placeholder`].
    pub fn placeholder(
        &mut self,
        reference: &str,
        namespace: Namespace,
    ) -> Result<Placeholder, NamingError> {
        self.registry.placeholder(reference, namespace)
    }

    /// Add a declaration and schedule it once.
    ///
    /// Returns false, keeping the first text, when `id` is already declared.
    /// Dependencies are recorded either way.
    pub fn declare<I, S>(
        &mut self,
        id: impl Into<String>,
        plugin: impl Into<String>,
        text: impl Into<String>,
        dependencies: I,
    ) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        for dependency in dependencies {
            self.graph.add_dependency(id.clone(), dependency);
        }
        match self.declarations.entry(id.clone()) {
            Entry::Occupied(_) => {
                debug!(id = %id, "Declaration already present, keeping first.");
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(Declaration {
                    id: id.clone(),
                    plugin: plugin.into(),
                    text: text.into(),
                });
                self.graph.add_node(id.clone());
                self.scheduled.push(id);
                true
            }
        }
    }

    /// Queue `id` for emission again, e.g. when another declaration found it
    /// as a dependency. Each declaration is still emitted once.
    pub fn schedule(&mut self, id: impl Into<String>) {
        self.scheduled.push(id.into());
    }

    /// Look up a declaration by id.
    pub fn declaration(&self, id: &str) -> Option<&Declaration> {
        self.declarations.get(id)
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations in a forward-reference-safe order.
    ///
    /// Definition indices come from the topological walk of the declaration
    /// graph; scheduled ids are drained through the min-heap and each
    /// declaration is yielded once. Ids scheduled but never declared are
    /// skipped.
    pub fn emission_order(&self, options: &WalkOptions<'_>) -> Vec<&Declaration> {
        let definition_index: HashMap<String, u64> = walk_topological(&self.graph, options)
            .into_iter()
            .zip(0_u64..)
            .collect();

        let mut heap = MinHeap::new(definition_index);
        for id in &self.scheduled {
            heap.push(id.clone());
        }

        let mut emitted: HashSet<String> = HashSet::with_capacity(self.declarations.len());
        let mut order = Vec::with_capacity(self.declarations.len());
        while let Some(id) = heap.pop() {
            if emitted.contains(&id) {
                continue;
            }
            match self.declarations.get(&id) {
                Some(declaration) => order.push(declaration),
                None => warn!(id = %id, "Scheduled declaration was never declared."),
            }
            emitted.insert(id);
        }
        order
    }

    /// Join the declarations in emission order and substitute placeholders.
    pub fn render(&self, options: &WalkOptions<'_>) -> Result<String, NamingError> {
        let body = self
            .emission_order(options)
            .into_iter()
            .map(|declaration| declaration.text.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n");
        self.registry.resolve_placeholders(&body)
    }
}
