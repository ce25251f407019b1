//! Deferred names.
//!
//! A generator may need to mention an entity before any generator has minted
//! its name. It embeds a placeholder token in the emitted text instead, and
//! the tokens are substituted once every plugin has run.

use std::fmt;

use super::Namespace;

const TOKEN_OPEN: &str = "\u{1d}specgen:";
const TOKEN_CLOSE: char = '\u{1d}';

/// Handle to a name that will be looked up when text is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    id: usize,
    token: String,
}

impl Placeholder {
    pub(super) fn new(id: usize) -> Self {
        Self {
            id,
            token: format!("{TOKEN_OPEN}{id}{TOKEN_CLOSE}"),
        }
    }

    /// Sequence number of this placeholder within its registry.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The token to splice into emitted text.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// What a placeholder stands for.
#[derive(Debug, Clone)]
pub(super) struct Deferred {
    pub reference: String,
    pub namespace: Namespace,
}

/// Replace every well-formed token in `text` with the name `resolve` returns
/// for its id. Malformed tokens are copied through untouched.
pub(super) fn substitute<E>(
    text: &str,
    mut resolve: impl FnMut(usize) -> Result<String, E>,
) -> Result<String, E> {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(TOKEN_OPEN) {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + TOKEN_OPEN.len()..];
        let parsed = after_open.find(TOKEN_CLOSE).and_then(|end| {
            after_open[..end]
                .parse::<usize>()
                .ok()
                .map(|id| (id, end + TOKEN_CLOSE.len_utf8()))
        });
        match parsed {
            Some((id, consumed)) => {
                output.push_str(&resolve(id)?);
                rest = &after_open[consumed..];
            }
            None => {
                output.push_str(TOKEN_OPEN);
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    Ok(output)
}
