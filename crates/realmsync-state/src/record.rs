//! Managed-state records
//!
//! A record is the set of identifiers realmsync created or controls for one
//! resource category of one namespace. It is read at the start of a run,
//! reconciled against the desired identifiers, then written back whole.

use crate::error::{CodecError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// Attribute key prefix of every managed-state record
pub const STATE_KEY_PREFIX: &str = "realmsync.state";

/// Logical key of a record: namespace plus resource category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub namespace: String,
    pub category: String,
}

impl StateKey {
    /// Build a key; the category must not end in a `-<digits>` segment
    ///
    /// Such a category would render as a numbered slot of another key
    /// (`roles-0` is slot 0 of `roles`).
    pub fn new(namespace: impl Into<String>, category: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let category = category.into();

        if namespace.is_empty() || category.is_empty() {
            return Err(CodecError::invalid_config(
                "state namespace and category must not be empty",
            ));
        }

        let last_segment = category.rsplit('-').next().unwrap_or_default();
        if !last_segment.is_empty() && last_segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::invalid_config(format!(
                "state category '{}' must not end in a numeric segment",
                category
            )));
        }

        Ok(Self {
            namespace,
            category,
        })
    }

    /// Attribute name the record is stored under, before slot suffixes
    pub fn attribute_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", STATE_KEY_PREFIX, self.namespace, self.category)
    }
}

/// Outcome of reconciling a record against desired identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDelta {
    /// Desired but not previously managed
    pub added: BTreeSet<String>,
    /// Previously managed but no longer desired
    pub removed: BTreeSet<String>,
    /// Managed before and still desired
    pub retained: BTreeSet<String>,
}

impl StateDelta {
    /// Nothing added or removed
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedStateRecord {
    key: StateKey,
    identifiers: BTreeSet<String>,
}

impl ManagedStateRecord {
    /// Empty record
    pub fn new(key: StateKey) -> Self {
        Self {
            key,
            identifiers: BTreeSet::new(),
        }
    }

    pub fn with_identifiers<I, S>(key: StateKey, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a decoded payload (a JSON array of strings)
    ///
    /// An empty payload is an empty record.
    pub fn from_payload(key: StateKey, payload: &str) -> Result<Self> {
        if payload.trim().is_empty() {
            return Ok(Self::new(key));
        }

        let identifiers: BTreeSet<String> = serde_json::from_str(payload).map_err(|e| {
            CodecError::invalid_payload(format!(
                "{} is not a JSON array of strings: {}",
                key, e
            ))
        })?;

        Ok(Self { key, identifiers })
    }

    /// Serialize as a sorted JSON array of strings
    pub fn to_payload(&self) -> Result<String> {
        serde_json::to_string(&self.identifiers)
            .map_err(|e| CodecError::invalid_payload(e.to_string()))
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn identifiers(&self) -> &BTreeSet<String> {
        &self.identifiers
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Replace the managed set with `desired` and report what changed
    pub fn reconcile<I, S>(&mut self, desired: I) -> StateDelta
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let desired: BTreeSet<String> = desired.into_iter().map(Into::into).collect();

        let delta = StateDelta {
            added: desired.difference(&self.identifiers).cloned().collect(),
            removed: self.identifiers.difference(&desired).cloned().collect(),
            retained: desired.intersection(&self.identifiers).cloned().collect(),
        };

        self.identifiers = desired;
        delta
    }
}
