//! Binary min-heap ordered by an injected definition-index lookup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;

use indexmap::IndexMap;

/// Source of the value a scheduled id is ordered by.
///
/// The lookup is consulted on every comparison, so an index that changes
/// between pushes affects all later comparisons of that id.
pub trait DefinitionIndex<K> {
    /// Index of `id`, or `None` when it has none (sorts last).
    fn definition_index(&self, id: &K) -> Option<u64>;
}

impl<K, S> DefinitionIndex<K> for HashMap<K, u64, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn definition_index(&self, id: &K) -> Option<u64> {
        self.get(id).copied()
    }
}

impl<K, S> DefinitionIndex<K> for IndexMap<K, u64, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn definition_index(&self, id: &K) -> Option<u64> {
        self.get(id).copied()
    }
}

impl<K, M> DefinitionIndex<K> for Rc<RefCell<M>>
where
    M: DefinitionIndex<K>,
{
    fn definition_index(&self, id: &K) -> Option<u64> {
        self.borrow().definition_index(id)
    }
}

impl<K, F> DefinitionIndex<K> for F
where
    F: Fn(&K) -> Option<u64>,
{
    fn definition_index(&self, id: &K) -> Option<u64> {
        self(id)
    }
}

/// Array-backed min-heap of ids.
///
/// The same id may be pushed any number of times; each push occupies its own
/// slot and is popped independently.
pub struct MinHeap<K, L> {
    heap: Vec<K>,
    lookup: L,
}

impl<K, L> MinHeap<K, L>
where
    L: DefinitionIndex<K>,
{
    /// An empty heap ordered by `lookup`.
    pub fn new(lookup: L) -> Self {
        Self {
            heap: Vec::new(),
            lookup,
        }
    }

    /// Insert `id`, sifting it toward the root.
    pub fn push(&mut self, id: K) {
        self.heap.push(id);
        let mut index = self.heap.len() - 1;
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.key(index) < self.key(parent) {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Remove and return the id with the smallest index.
    pub fn pop(&mut self) -> Option<K> {
        let last = self.heap.pop()?;
        if self.heap.is_empty() {
            return Some(last);
        }
        let top = std::mem::replace(&mut self.heap[0], last);
        self.sift_down(0);
        Some(top)
    }

    /// The id [`Self::pop`] would return next.
    pub fn peek(&self) -> Option<&K> {
        self.heap.first()
    }

    /// Number of queued entries, duplicates included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The injected lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Mutable access to the lookup. Ids already queued are not re-sifted.
    pub fn lookup_mut(&mut self) -> &mut L {
        &mut self.lookup
    }

    fn key(&self, position: usize) -> u64 {
        self.lookup
            .definition_index(&self.heap[position])
            .unwrap_or(u64::MAX)
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.key(left) < self.key(smallest) {
                smallest = left;
            }
            if right < len && self.key(right) < self.key(smallest) {
                smallest = right;
            }
            if smallest == index {
                return;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<K: fmt::Debug, L> fmt::Debug for MinHeap<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinHeap").field("heap", &self.heap).finish_non_exhaustive()
    }
}
