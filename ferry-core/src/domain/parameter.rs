//! Parameter domain types
//!
//! Configuration values are read from a shared, process-external key/value
//! store while the descriptor is being composed. The store is read-only from
//! Ferry's point of view.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DescriptorError, ParameterError};

/// Hierarchical key into the parameter store (e.g. `/ns/pool_id`)
///
/// Keys always start with `/`, have no empty segments and at least one
/// namespace segment above the leaf.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParameterKey(String);

impl ParameterKey {
    /// Parse and validate a parameter key
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        if !raw.starts_with('/') {
            return Err(DescriptorError::invalid(format!(
                "Parameter key '{}' must start with '/'",
                raw
            )));
        }

        let segments: Vec<&str> = raw[1..].split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DescriptorError::invalid(format!(
                "Parameter key '{}' contains an empty segment",
                raw
            )));
        }

        if segments.len() < 2 {
            return Err(DescriptorError::invalid(format!(
                "Parameter key '{}' must live under a namespace (e.g. /app/{})",
                raw, segments[0]
            )));
        }

        if let Some(bad) = raw.chars().find(|c| !is_key_char(*c)) {
            return Err(DescriptorError::invalid(format!(
                "Parameter key '{}' contains '{}' (allowed: letters, digits, '_', '.', '-', '/')",
                raw, bad
            )));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent path of the key, without the leading slash
    ///
    /// `/AgenticLLMAssistantWorkshop/agent_api` has namespace
    /// `AgenticLLMAssistantWorkshop`.
    pub fn namespace(&self) -> &str {
        let trimmed = &self.0[1..];
        match trimmed.rfind('/') {
            Some(pos) => &trimmed[..pos],
            None => trimmed,
        }
    }
}

/// Characters a key may use; keys travel unencoded in store URLs
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ParameterKey {
    type Error = DescriptorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ParameterKey> for String {
    fn from(key: ParameterKey) -> Self {
        key.0
    }
}

/// A value resolved from the parameter store
///
/// Resolved once per composition and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    pub key: ParameterKey,
    pub value: String,
}

/// Trait for reading parameters from the shared configuration store
///
/// Implementations decide where values come from (HTTP service, local file,
/// in-memory map). Ferry never writes to the store.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Get the current value for a key
    ///
    /// # Errors
    /// - `ParameterError::NotFound` if the key is absent
    /// - `ParameterError::PermissionDenied` if the resolving identity may not read it
    /// - `ParameterError::Unavailable` if the store itself failed
    async fn get_parameter(&self, key: &ParameterKey) -> Result<ConfigValue, ParameterError>;
}

/// In-memory parameter store
///
/// Optionally restricted to a readable prefix, which models the scope of the
/// resolving identity: keys outside the prefix are reported as denied.
#[derive(Debug, Clone, Default)]
pub struct MemoryParameterStore {
    values: BTreeMap<String, String>,
    readable_prefix: Option<String>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter value
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Restricts reads to keys under `prefix`
    pub fn with_readable_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.readable_prefix = Some(prefix.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for MemoryParameterStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            readable_prefix: None,
        }
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameter(&self, key: &ParameterKey) -> Result<ConfigValue, ParameterError> {
        if let Some(prefix) = &self.readable_prefix {
            if !key.as_str().starts_with(prefix.as_str()) {
                return Err(ParameterError::PermissionDenied(key.to_string()));
            }
        }

        self.values
            .get(key.as_str())
            .map(|value| ConfigValue {
                key: key.clone(),
                value: value.clone(),
            })
            .ok_or_else(|| ParameterError::NotFound(key.to_string()))
    }
}
