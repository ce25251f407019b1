//! Declaration graph and the two orders it can be walked in.

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use super::heap::MinHeap;

/// Priority for nodes the priority function says nothing about.
const DEFAULT_PRIORITY: u64 = 10;

/// Declarations keyed by id, with the ids each one depends on.
#[derive(Debug, Clone, Default)]
pub struct DeclarationGraph {
    nodes: IndexSet<String>,
    dependencies: IndexMap<String, IndexSet<String>>,
}

impl DeclarationGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; returns false if it was already present.
    pub fn add_node(&mut self, id: impl Into<String>) -> bool {
        self.nodes.insert(id.into())
    }

    /// Record that `node` depends on `dependency`.
    ///
    /// Neither id has to be a node yet. Edges to ids that never become nodes
    /// are ignored when walking.
    pub fn add_dependency(&mut self, node: impl Into<String>, dependency: impl Into<String>) {
        self.dependencies
            .entry(node.into())
            .or_default()
            .insert(dependency.into());
    }

    /// Whether `id` is a node.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Raw dependencies of `id`, including unknown ids.
    pub fn dependencies_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Optional ordering hints for [`walk_declarations`] and [`walk_topological`].
#[derive(Default)]
pub struct WalkOptions<'a> {
    priority: Option<&'a dyn Fn(&str) -> Option<u64>>,
    prefer_groups: Vec<String>,
    group_of: Option<&'a dyn Fn(&str) -> Option<String>>,
}

impl<'a> WalkOptions<'a> {
    /// No hints: plain insertion order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Priority band per node; lower bands are emitted first when the
    /// dependency graph allows it. Unprioritized nodes use band 10.
    pub fn priority(mut self, priority: &'a dyn Fn(&str) -> Option<u64>) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Groups to move to the front, in order, and the function that assigns
    /// a node to a group.
    pub fn prefer_groups<I, S>(
        mut self,
        groups: I,
        group_of: &'a dyn Fn(&str) -> Option<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefer_groups = groups.into_iter().map(Into::into).collect();
        self.group_of = Some(group_of);
        self
    }

    fn group_rank(&self, id: &str) -> usize {
        let fallback = self.prefer_groups.len();
        let Some(group_of) = self.group_of else {
            return fallback;
        };
        group_of(id)
            .and_then(|group| self.prefer_groups.iter().position(|g| *g == group))
            .unwrap_or(fallback)
    }
}

impl fmt::Debug for WalkOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkOptions")
            .field("priority", &self.priority.is_some())
            .field("prefer_groups", &self.prefer_groups)
            .field("group_of", &self.group_of.is_some())
            .finish()
    }
}

/// Node ids in insertion order, preferred groups first.
pub fn walk_declarations(graph: &DeclarationGraph, options: &WalkOptions<'_>) -> Vec<String> {
    let nodes: Vec<&str> = graph.nodes().collect();
    if options.prefer_groups.is_empty() || options.group_of.is_none() {
        return nodes.into_iter().map(str::to_string).collect();
    }

    let mut order: IndexSet<&str> = IndexSet::with_capacity(nodes.len());
    for rank in 0..options.prefer_groups.len() {
        order.extend(
            nodes
                .iter()
                .copied()
                .filter(|id| options.group_rank(id) == rank),
        );
    }
    order.extend(nodes.iter().copied());
    order.into_iter().map(str::to_string).collect()
}

/// Node ids with every node after the nodes it depends on.
///
/// Ties are broken by priority band, then insertion order. Self edges and
/// edges to unknown ids are ignored. Nodes left over by a cycle are appended
/// in declaration order. Preferred groups are moved forward only when that
/// breaks no dependency edge crossing from a later group into an earlier one.
pub fn walk_topological(graph: &DeclarationGraph, options: &WalkOptions<'_>) -> Vec<String> {
    let nodes: Vec<&str> = graph.nodes().collect();

    let mut ranked: Vec<(u64, usize, &str)> = nodes
        .iter()
        .enumerate()
        .map(|(position, &id)| {
            let band = options
                .priority
                .and_then(|priority| priority(id))
                .unwrap_or(DEFAULT_PRIORITY);
            (band, position, id)
        })
        .collect();
    ranked.sort_unstable();
    let decl_index: HashMap<&str, u64> = ranked
        .into_iter()
        .zip(0_u64..)
        .map(|((_, _, id), rank)| (id, rank))
        .collect();

    let mut deps_of: IndexMap<&str, IndexSet<&str>> = IndexMap::with_capacity(nodes.len());
    for &id in &nodes {
        let deps = graph
            .dependencies_of(id)
            .filter(|dep| *dep != id && graph.contains(dep))
            .collect();
        deps_of.insert(id, deps);
    }

    let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for (&id, deps) in &deps_of {
        in_degree.insert(id, deps.len());
        for &dep in deps {
            dependents.entry(dep).or_default().push(id);
        }
    }

    let mut heap = MinHeap::new(decl_index);
    for &id in &nodes {
        if in_degree.get(id).copied().unwrap_or_default() == 0 {
            heap.push(id);
        }
    }

    let mut emitted: IndexSet<&str> = IndexSet::with_capacity(nodes.len());
    while let Some(current) = heap.pop() {
        if !emitted.insert(current) {
            continue;
        }
        for &dependent in dependents.get(current).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    heap.push(dependent);
                }
            }
        }
    }

    let decl_index = heap.lookup();
    let mut remaining: Vec<&str> = nodes
        .iter()
        .copied()
        .filter(|id| !emitted.contains(id))
        .collect();
    remaining.sort_by_key(|id| decl_index.get(id).copied().unwrap_or(u64::MAX));
    emitted.extend(remaining);
    let order: Vec<&str> = emitted.into_iter().collect();

    let order = if options.prefer_groups.is_empty() {
        order
    } else {
        prefer_groups_when_safe(order, &deps_of, options)
    };
    order.into_iter().map(str::to_string).collect()
}

fn prefer_groups_when_safe<'g>(
    order: Vec<&'g str>,
    deps_of: &IndexMap<&'g str, IndexSet<&'g str>>,
    options: &WalkOptions<'_>,
) -> Vec<&'g str> {
    let mut proposed = order.clone();
    proposed.sort_by_key(|id| options.group_rank(id));

    let proposed_index: HashMap<&str, usize> = proposed
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position))
        .collect();

    for (node, deps) in deps_of {
        let node_rank = options.group_rank(node);
        for dep in deps {
            if options.group_rank(dep) <= node_rank {
                continue;
            }
            if proposed_index[dep] >= proposed_index[node] {
                return order;
            }
        }
    }
    proposed
}
