//! Plugin catalog and dependency resolution.
//!
//! A generation request names the plugins it wants; [`resolve`] expands that
//! list with static and inferred dependencies and returns an order in which
//! every plugin runs after the plugins it depends on.

mod definition;
mod resolver;

pub use definition::{InferenceHook, PluginCatalog, PluginDefinition, PluginOverride};
pub use resolver::{InferenceContext, PluginRecord, Resolution, TagLookup, resolve};
