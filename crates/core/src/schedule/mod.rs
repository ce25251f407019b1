//! Declaration emission scheduling.
//!
//! Declarations are emitted in ascending definition index. The index comes
//! from a lookup injected into [`MinHeap`] rather than from the queued values,
//! so one id can be queued from several call sites and re-prioritized between
//! pushes.

mod heap;
mod walk;

pub use heap::{DefinitionIndex, MinHeap};
pub use walk::{DeclarationGraph, WalkOptions, walk_declarations, walk_topological};
