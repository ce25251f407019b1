//! Error types shared by the core components.
//!
//! Naming collisions are never errors: the registry resolves them by
//! suffixing. Only malformed references, unresolved deferred names and
//! plugin graph problems surface here.

use thiserror::Error;

use crate::naming::Namespace;

/// Errors raised while parsing a `$ref`-style pointer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    /// The pointer ends in a property accessor with nothing after it.
    #[error("Invalid reference: {reference}")]
    InvalidReference {
        /// The pointer as it was supplied.
        reference: String,
    },
}

/// Errors raised by the identifier registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The reference could not be parsed.
    #[error(transparent)]
    Reference(#[from] RefError),

    /// A placeholder was substituted before its target received a name.
    #[error("Unresolved placeholder for '{reference}' in namespace '{namespace}'")]
    UnresolvedPlaceholder {
        /// Reference the placeholder stands for.
        reference: String,
        /// Namespace the name was expected in.
        namespace: Namespace,
    },
}

/// Errors raised while resolving the plugin execution order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A requested plugin or a dependency has no catalog entry.
    #[error(
        "unknown plugin dependency \"{name}\" - do you need to register a custom plugin with this name?"
    )]
    UnknownPlugin {
        /// The missing plugin name.
        name: String,
    },

    /// A dependency cycle is reachable from the requested plugins.
    #[error("Circular reference detected at '{name}'")]
    CircularDependency {
        /// The plugin at which the cycle was re-entered.
        name: String,
    },

    /// An inference hook asked for a capability no candidate plugin offers.
    #[error("{message}")]
    MissingTag {
        /// The capability tag that was requested.
        tag: String,
        /// Human readable explanation, always mentions the tag unless the
        /// hook supplied its own message.
        message: String,
    },

    /// A custom definition tried to replace a built-in plugin.
    #[error(
        "cannot register plugin \"{name}\" - a built-in plugin with this name already exists"
    )]
    NativeOverride {
        /// The contested plugin name.
        name: String,
    },
}

impl ResolveError {
    /// Default error for a capability lookup that found nothing.
    pub fn missing_tag(tag: &str) -> Self {
        Self::MissingTag {
            tag: tag.to_string(),
            message: format!("missing plugin - no plugin with tag \"{tag}\" found"),
        }
    }
}
