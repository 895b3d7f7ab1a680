//! Parameter store DTOs

use serde::{Deserialize, Serialize};

/// A parameter as returned by the parameter store API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub version: Option<u64>,
}
