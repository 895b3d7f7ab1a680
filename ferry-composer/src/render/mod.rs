//! Rendering
//!
//! Turns a composed descriptor into the documents handed to the deployment
//! platform: a JSON deployment template and a YAML build specification.
//! Both are byte-identical for identical descriptors.

mod buildspec;
mod template;

pub use buildspec::render_buildspec;
pub use template::{branch_logical_id, render_template};

use thiserror::Error;

/// Errors that can occur while rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to render build specification: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render deployment template: {0}")]
    Json(#[from] serde_json::Error),

    /// Two branches map onto the same template resource name
    #[error("Branches '{first}' and '{second}' both render as resource '{logical_id}'")]
    LogicalIdCollision {
        first: String,
        second: String,
        logical_id: String,
    },
}
