//! Environment domain types
//!
//! Variable names are a versioned contract with the hosted application:
//! renaming one is a breaking change, handled through legacy aliases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::parameter::ParameterKey;

/// Value of an environment entry as declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EnvValue {
    Literal(String),
    Parameter(ParameterKey),
}

/// Where an injected value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum EnvOrigin {
    Literal,
    Parameter { key: ParameterKey },
    /// Legacy name mirroring a canonical entry
    Alias { canonical: String },
}

/// A single injected entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntry {
    pub value: String,
    #[serde(flatten)]
    pub origin: EnvOrigin,
}

/// Flat name → value mapping visible to the build and the runtime
///
/// Keys are unique; inserting an existing name replaces its entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentMap {
    entries: BTreeMap<String, EnvEntry>,
}

impl EnvironmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous entry with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>, origin: EnvOrigin) {
        self.entries.insert(
            name.into(),
            EnvEntry {
                value: value.into(),
                origin,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.value.as_str())
    }

    pub fn entry(&self, name: &str) -> Option<&EnvEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain name → value view
    pub fn to_values(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
