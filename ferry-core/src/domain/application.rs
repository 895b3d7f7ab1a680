//! Application descriptor
//!
//! The aggregate produced by one composition: identity, source, build plan,
//! environment and release topology, plus the values that were resolved to
//! build it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::build::BuildSpec;
use super::environment::EnvironmentMap;
use super::identity::ExecutionIdentity;
use super::parameter::ConfigValue;
use super::release::ReleaseTopology;
use super::source::SourceBinding;
use super::target::DeploymentTarget;

/// Hosting platform of the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    /// Static hosting
    Web,
    /// Server-side rendering
    #[default]
    WebCompute,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "WEB",
            Platform::WebCompute => "WEB_COMPUTE",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WEB" => Ok(Platform::Web),
            "WEB_COMPUTE" => Ok(Platform::WebCompute),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Fully composed application descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub target: DeploymentTarget,
    pub identity: ExecutionIdentity,
    pub source: SourceBinding,
    pub build_spec: BuildSpec,
    pub environment: EnvironmentMap,
    pub topology: ReleaseTopology,
    /// Values read from the parameter store, by key
    pub resolved: BTreeMap<String, ConfigValue>,
}

/// Identifiers published once the descriptor is composed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationOutputs {
    pub app_id: String,
    pub default_domain: String,
    /// Public URL per declared branch
    pub branch_urls: BTreeMap<String, String>,
}
