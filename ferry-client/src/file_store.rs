//! File-backed parameter store

use async_trait::async_trait;
use ferry_core::ParameterError;
use ferry_core::domain::parameter::{ConfigValue, ParameterKey, ParameterStore};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::{ClientError, Result};

/// Parameter store loaded from a JSON object of `{ "/ns/key": "value" }`
///
/// The file is read once at construction; later edits are not seen.
#[derive(Debug, Clone)]
pub struct FileParameterStore {
    values: BTreeMap<String, String>,
}

impl FileParameterStore {
    /// Load parameters from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        info!(
            "Loaded {} parameter(s) from {}",
            store.values.len(),
            path.display()
        );
        Ok(store)
    }

    /// Parse parameters from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let values: BTreeMap<String, String> = serde_json::from_str(content).map_err(|e| {
            ClientError::ParseError(format!(
                "Parameter file must be a JSON object of string values: {}",
                e
            ))
        })?;

        for key in values.keys() {
            ParameterKey::parse(key)
                .map_err(|e| ClientError::ParseError(format!("Invalid key in parameter file: {}", e)))?;
        }

        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl ParameterStore for FileParameterStore {
    async fn get_parameter(
        &self,
        key: &ParameterKey,
    ) -> std::result::Result<ConfigValue, ParameterError> {
        self.values
            .get(key.as_str())
            .map(|value| ConfigValue {
                key: key.clone(),
                value: value.clone(),
            })
            .ok_or_else(|| ParameterError::NotFound(key.to_string()))
    }
}
