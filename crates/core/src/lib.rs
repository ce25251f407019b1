//! Naming, plugin ordering and declaration scheduling for OpenAPI code
//! generators.
//!
//! Independently written generator plugins share one [`GenerationContext`]
//! per request:
//!
//! - [`naming::IdentifierRegistry`] hands out collision-free display names
//!   keyed by `$ref` pointer and [`naming::Namespace`].
//! - [`plugins::resolve`] turns the requested plugin list into a
//!   dependency-respecting execution order.
//! - [`schedule::MinHeap`] and the declaration walks order emitted
//!   declarations so forward references stay legal.
//!
//! Everything here is synchronous and performs no I/O.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod context;
pub mod error;
pub mod naming;
pub mod plugins;
pub mod refs;
pub mod schedule;

pub use context::{Declaration, GenerationContext};
pub use error::{NamingError, RefError, ResolveError};
pub use naming::{
    CaseStyle, Identifier, IdentifierRegistry, IdentifierRequest, NameRecord, Namespace,
    Placeholder,
};
pub use plugins::{PluginCatalog, PluginDefinition, Resolution, resolve};
pub use refs::{ParsedRef, parse_ref};
pub use schedule::{DeclarationGraph, MinHeap, WalkOptions};
