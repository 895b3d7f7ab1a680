//! Repository host DTOs

use serde::{Deserialize, Serialize};

/// Subset of the repository metadata returned by the repository host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
}
