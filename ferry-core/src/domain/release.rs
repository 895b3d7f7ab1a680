//! Release topology domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::build::BuildSpec;
use super::environment::EnvironmentMap;

/// Promotion stage of a release environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Production,
    Staging,
    Beta,
    Development,
    Experimental,
    PullRequest,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Production => "PRODUCTION",
            Stage::Staging => "STAGING",
            Stage::Beta => "BETA",
            Stage::Development => "DEVELOPMENT",
            Stage::Experimental => "EXPERIMENTAL",
            Stage::PullRequest => "PULL_REQUEST",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PRODUCTION" => Ok(Stage::Production),
            "STAGING" => Ok(Stage::Staging),
            "BETA" => Ok(Stage::Beta),
            "DEVELOPMENT" => Ok(Stage::Development),
            "EXPERIMENTAL" => Ok(Stage::Experimental),
            "PULL_REQUEST" => Ok(Stage::PullRequest),
            other => Err(format!("unknown stage '{}'", other)),
        }
    }
}

/// A declared source branch and how it is released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseBranch {
    pub name: String,
    pub stage: Stage,
    /// Build automatically on every push
    pub auto_build: bool,
    /// Tear the environment down when the source branch is deleted
    pub auto_delete: bool,
}

impl ReleaseBranch {
    pub fn new(name: impl Into<String>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage,
            auto_build: true,
            auto_delete: false,
        }
    }

    pub fn with_auto_delete(mut self, auto_delete: bool) -> Self {
        self.auto_delete = auto_delete;
        self
    }

    pub fn with_auto_build(mut self, auto_build: bool) -> Self {
        self.auto_build = auto_build;
        self
    }
}

/// Host label of a branch URL: slashes become dashes
///
/// `feature/login` is served from `feature-login.<domain>`.
pub fn url_label(branch: &str) -> String {
    branch.replace('/', "-")
}

/// Alphanumeric PascalCase form of a branch name
///
/// `feature/login-page` becomes `FeatureLoginPage`.
pub fn pascal_label(branch: &str) -> String {
    let mut label = String::new();
    for word in branch.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            label.push(first.to_ascii_uppercase());
            label.extend(chars);
        }
    }
    label
}

/// A deployed instance tied to one branch and one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEnvironment {
    pub branch: ReleaseBranch,
    pub build_spec: BuildSpec,
    pub environment: EnvironmentMap,
}

/// Every release environment of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTopology {
    pub environments: Vec<ReleaseEnvironment>,
    /// Delete environments of non-declared branches when the branch goes away
    pub auto_branch_deletion: bool,
}

impl ReleaseTopology {
    pub fn branch_names(&self) -> Vec<&str> {
        self.environments
            .iter()
            .map(|e| e.branch.name.as_str())
            .collect()
    }

    pub fn environment(&self, branch: &str) -> Option<&ReleaseEnvironment> {
        self.environments.iter().find(|e| e.branch.name == branch)
    }
}
