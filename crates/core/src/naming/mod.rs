//! Identifier registry.
//!
//! Every display name a generator prints goes through
//! [`IdentifierRegistry::ensure_unique_identifier`]. Names are bucketed by
//! their case-folded form (the *slot*); within a slot a display name is owned
//! by at most one `(reference, namespace)` pair, and later claimants get a
//! numeric suffix starting at 2.
//!
//! The registry is plain per-run state. Construct one per generation request
//! and pass it to whatever mints names.

mod case;
mod placeholder;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::NamingError;
use crate::refs::parse_ref;

pub use case::CaseStyle;
pub use placeholder::Placeholder;

use placeholder::{Deferred, substitute};

/// Kinds of emitted declarations that share one display-name space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Type aliases and interfaces.
    Type,
    /// Enum-like constant objects.
    Enum,
    /// Runtime values: functions, constants.
    Value,
}

impl Namespace {
    /// Every namespace, in slot iteration order.
    pub const ALL: [Namespace; 3] = [Namespace::Type, Namespace::Enum, Namespace::Value];

    /// Lowercase spelling used in configs and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Type => "type",
            Namespace::Enum => "enum",
            Namespace::Value => "value",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments to [`IdentifierRegistry::ensure_unique_identifier`].
#[derive(Clone, Copy)]
pub struct IdentifierRequest<'a> {
    reference: &'a str,
    namespace: Namespace,
    case: CaseStyle,
    create: bool,
    name_transformer: Option<&'a dyn Fn(&str) -> String>,
}

impl<'a> IdentifierRequest<'a> {
    /// A lookup-only request using the default case style.
    pub fn new(reference: &'a str, namespace: Namespace) -> Self {
        Self {
            reference,
            namespace,
            case: CaseStyle::default(),
            create: false,
            name_transformer: None,
        }
    }

    /// Case style applied to the (transformed) entity name.
    pub fn case(mut self, case: CaseStyle) -> Self {
        self.case = case;
        self
    }

    /// Allocate a name when the reference has none yet.
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Rewrite the raw entity name before casing, e.g. to add a suffix.
    pub fn transform(mut self, transformer: &'a dyn Fn(&str) -> String) -> Self {
        self.name_transformer = Some(transformer);
        self
    }

    /// The pointer this request is about.
    pub fn reference(&self) -> &'a str {
        self.reference
    }

    fn with_reference(self, reference: &'a str) -> Self {
        Self { reference, ..self }
    }
}

impl fmt::Debug for IdentifierRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierRequest")
            .field("reference", &self.reference)
            .field("namespace", &self.namespace)
            .field("case", &self.case)
            .field("create", &self.create)
            .field("name_transformer", &self.name_transformer.is_some())
            .finish()
    }
}

/// Outcome of a registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Whether this call allocated the name.
    pub created: bool,
    /// The display name; empty when the reference has no name.
    pub name: String,
}

impl Identifier {
    fn none() -> Self {
        Self {
            created: false,
            name: String::new(),
        }
    }

    fn existing(name: impl Into<String>) -> Self {
        Self {
            created: false,
            name: name.into(),
        }
    }

    /// Whether the lookup produced no name.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// A name owned by a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRecord {
    /// Base reference (no property path) that owns the name.
    pub reference: String,
    /// The display name.
    pub name: String,
}

/// Per-slot storage: each namespace maps both the owning reference and the
/// display name to the same record.
#[derive(Debug, Default)]
struct Slot {
    namespaces: BTreeMap<Namespace, IndexMap<String, NameRecord>>,
}

enum NameStatus {
    Free,
    Owned,
    Taken,
}

/// Collision-free name allocation for one generation run.
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    slots: HashMap<String, Slot>,
    assigned: BTreeMap<Namespace, HashMap<String, String>>,
    deferred: Vec<Deferred>,
}

impl IdentifierRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stable display name for a reference, allocating one when
    /// the request allows it.
    ///
    /// Property references (`.../User/properties/id`) resolve the entity
    /// first and return an accessor over its name (`User['id']`).
    pub fn ensure_unique_identifier(
        &mut self,
        request: IdentifierRequest<'_>,
    ) -> Result<Identifier, NamingError> {
        let parsed = parse_ref(request.reference)?;
        if parsed.entity_name.is_empty() {
            return Ok(Identifier::none());
        }

        if parsed.is_property_access() {
            let base = self.ensure_unique_identifier(request.with_reference(&parsed.reference))?;
            if base.is_empty() {
                return Ok(base);
            }
            return Ok(Identifier {
                created: base.created,
                name: property_accessor(&base.name, &parsed.property_path),
            });
        }

        let reference = parsed.reference.as_str();
        let transformed = match request.name_transformer {
            Some(transformer) => transformer(&parsed.entity_name),
            None => parsed.entity_name.clone(),
        };
        let candidate = request.case.apply(&transformed);
        if candidate.is_empty() {
            return Ok(Identifier::none());
        }
        let slot_key = fold(&candidate);

        if let Some(record) = self
            .slots
            .get(&slot_key)
            .and_then(|slot| slot.namespaces.get(&request.namespace))
            .and_then(|records| records.get(reference))
            .filter(|record| record.reference == reference)
        {
            return Ok(Identifier::existing(record.name.as_str()));
        }
        // A suffixed name lives in another slot.
        if let Some(name) = self.assigned_name(reference, request.namespace) {
            return Ok(Identifier::existing(name));
        }

        if !request.create {
            self.slots.entry(slot_key).or_default();
            return Ok(Identifier::none());
        }

        // Counted names append the suffix to the already cased candidate.
        let mut count: usize = 1;
        loop {
            let name = if count == 1 {
                candidate.clone()
            } else {
                format!("{candidate}{count}")
            };
            match self.name_status(&name, request.namespace, reference) {
                NameStatus::Free => {
                    self.insert(&name, request.namespace, reference);
                    return Ok(Identifier {
                        created: true,
                        name,
                    });
                }
                NameStatus::Owned => return Ok(Identifier::existing(name)),
                NameStatus::Taken => {
                    trace!(
                        reference,
                        namespace = %request.namespace,
                        name = %name,
                        "Identifier taken, trying next suffix."
                    );
                    count += 1;
                }
            }
        }
    }

    /// Look up an existing name without allocating, deriving property
    /// accessors like [`Self::ensure_unique_identifier`] does.
    pub fn get(&self, reference: &str, namespace: Namespace) -> Option<String> {
        let parsed = parse_ref(reference).ok()?;
        if parsed.entity_name.is_empty() {
            return None;
        }
        let name = self.assigned_name(&parsed.reference, namespace)?;
        Some(property_accessor(name, &parsed.property_path))
    }

    /// Defer naming `reference` until [`Self::resolve_placeholders`] runs.
    pub fn placeholder(
        &mut self,
        reference: &str,
        namespace: Namespace,
    ) -> Result<Placeholder, NamingError> {
        parse_ref(reference)?;
        let id = self.deferred.len();
        self.deferred.push(Deferred {
            reference: reference.to_string(),
            namespace,
        });
        Ok(Placeholder::new(id))
    }

    /// Substitute every placeholder token in `text` with the name its
    /// reference holds now.
    pub fn resolve_placeholders(&self, text: &str) -> Result<String, NamingError> {
        substitute(text, |id| {
            let Some(deferred) = self.deferred.get(id) else {
                return Err(NamingError::UnresolvedPlaceholder {
                    reference: format!("#{id}"),
                    namespace: Namespace::Type,
                });
            };
            self.get(&deferred.reference, deferred.namespace)
                .ok_or_else(|| NamingError::UnresolvedPlaceholder {
                    reference: deferred.reference.clone(),
                    namespace: deferred.namespace,
                })
        })
    }

    /// Every allocated name, ordered by namespace then name.
    pub fn records(&self) -> Vec<(Namespace, &NameRecord)> {
        let mut records: Vec<(Namespace, &NameRecord)> = self
            .slots
            .values()
            .flat_map(|slot| {
                slot.namespaces.iter().flat_map(|(namespace, records)| {
                    records
                        .iter()
                        .filter(|(key, record)| **key == record.name)
                        .map(move |(_, record)| (*namespace, record))
                })
            })
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));
        records
    }

    /// Whether the case-folded slot for `name` has been materialized.
    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.contains_key(&fold(name))
    }

    /// Number of names allocated across all namespaces.
    pub fn len(&self) -> usize {
        self.assigned.values().map(HashMap::len).sum()
    }

    /// Whether no name has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn assigned_name(&self, reference: &str, namespace: Namespace) -> Option<&str> {
        self.assigned
            .get(&namespace)
            .and_then(|names| names.get(reference))
            .map(String::as_str)
    }

    fn name_status(&self, name: &str, namespace: Namespace, reference: &str) -> NameStatus {
        let Some(slot) = self.slots.get(&fold(name)) else {
            return NameStatus::Free;
        };
        let mut taken = false;
        for (owner_namespace, records) in &slot.namespaces {
            let Some(record) = records.get(name) else {
                continue;
            };
            if *owner_namespace == namespace && record.reference == reference {
                return NameStatus::Owned;
            }
            taken = true;
        }
        if taken { NameStatus::Taken } else { NameStatus::Free }
    }

    fn insert(&mut self, name: &str, namespace: Namespace, reference: &str) {
        let record = NameRecord {
            reference: reference.to_string(),
            name: name.to_string(),
        };
        let records = self
            .slots
            .entry(fold(name))
            .or_default()
            .namespaces
            .entry(namespace)
            .or_default();
        records.insert(reference.to_string(), record.clone());
        records.insert(name.to_string(), record);
        self.assigned
            .entry(namespace)
            .or_default()
            .insert(reference.to_string(), name.to_string());
        trace!(reference, namespace = %namespace, name, "Registered identifier.");
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn property_accessor(name: &str, path: &[String]) -> String {
    let mut accessor = name.to_string();
    for property in path {
        accessor.push_str("['");
        accessor.push_str(&property.replace('\\', "\\\\").replace('\'', "\\'"));
        accessor.push_str("']");
    }
    accessor
}
