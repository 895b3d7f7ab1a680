//! Descriptor manifest
//!
//! The declarative input to composition, as produced by the manifest parser.
//! A manifest holds references (parameter keys, secret names, candidate
//! directories) but no resolved values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::application::Platform;
use super::build::{ArtifactLocation, validate_relative_path, validate_working_directory};
use super::environment::EnvValue;
use super::identity::{Capability, PolicyStatement};
use super::parameter::ParameterKey;
use super::release::{ReleaseBranch, pascal_label, url_label};
use super::source::SecretRef;
use crate::error::DescriptorError;

/// Parsed descriptor manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorManifest {
    pub name: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub identity: IdentitySpec,
    pub source: SourceSpec,
    pub build: BuildManifest,
    pub environment: BTreeMap<String, EnvValue>,
    /// Legacy variable name → canonical variable name
    pub legacy_environment: BTreeMap<String, String>,
    pub auto_branch_deletion: bool,
    pub branches: Vec<ReleaseBranch>,
}

/// How the execution identity is obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum IdentitySpec {
    Declare {
        trusted_service: String,
        description: Option<String>,
        grants: Vec<GrantSpec>,
    },
    Reference {
        arn: String,
    },
}

/// A declared permission grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GrantSpec {
    Capability(Capability),
    Statement(PolicyStatement),
}

/// Source repository coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub owner: String,
    pub repository: String,
    pub token: SecretRef,
}

/// Build configuration surface
///
/// Artifact and cache paths are relative to the selected working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Candidate working directories, tried in order
    pub working_directories: Vec<String>,
    pub install: Vec<String>,
    pub build: Vec<String>,
    pub artifacts: ArtifactLocation,
    pub cache: Vec<String>,
}

impl DescriptorManifest {
    /// Every parameter key referenced by the environment, in key order
    pub fn parameter_keys(&self) -> BTreeSet<ParameterKey> {
        self.environment
            .values()
            .filter_map(|value| match value {
                EnvValue::Parameter(key) => Some(key.clone()),
                EnvValue::Literal(_) => None,
            })
            .collect()
    }

    /// Structural validation
    ///
    /// Checks everything that can be checked without the parameter store or
    /// the source layout.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::invalid("Application name cannot be empty"));
        }

        if self.name.len() > 255 {
            return Err(DescriptorError::invalid(
                "Application name is too long (max 255 characters)",
            ));
        }

        if self.source.owner.trim().is_empty() || self.source.repository.trim().is_empty() {
            return Err(DescriptorError::invalid(
                "Source owner and repository cannot be empty",
            ));
        }

        if self.source.token.name.trim().is_empty() {
            return Err(DescriptorError::ConfigurationMissing(
                "source token secret reference".to_string(),
            ));
        }

        if let IdentitySpec::Declare {
            trusted_service, ..
        } = &self.identity
        {
            if trusted_service.trim().is_empty() {
                return Err(DescriptorError::invalid(
                    "Declared identity needs a trusted service",
                ));
            }
        }

        self.validate_build()?;

        for (legacy, canonical) in &self.legacy_environment {
            if !self.environment.contains_key(canonical) {
                return Err(DescriptorError::invalid(format!(
                    "Legacy variable '{}' points at unknown variable '{}'",
                    legacy, canonical
                )));
            }
            if self.environment.contains_key(legacy) {
                return Err(DescriptorError::invalid(format!(
                    "Legacy variable '{}' is also declared directly",
                    legacy
                )));
            }
        }

        if self.branches.is_empty() {
            return Err(DescriptorError::invalid(
                "Descriptor must declare at least one branch",
            ));
        }

        let mut seen = HashSet::new();
        // Distinct names may still share a URL host or a template resource
        let mut hosts: HashMap<String, &str> = HashMap::new();
        let mut resources: HashMap<String, &str> = HashMap::new();
        for branch in &self.branches {
            let name = branch.name.as_str();
            if name.trim().is_empty() {
                return Err(DescriptorError::invalid("Branch name cannot be empty"));
            }
            if !seen.insert(name) {
                return Err(DescriptorError::invalid(format!(
                    "Branch '{}' is declared more than once",
                    name
                )));
            }

            let host = url_label(name).to_ascii_lowercase();
            let resource = pascal_label(name);
            for (label, claimed) in [(host, &mut hosts), (resource, &mut resources)] {
                if let Some(first) = claimed.insert(label.clone(), name) {
                    return Err(DescriptorError::invalid(format!(
                        "Branches '{}' and '{}' collide as '{}'",
                        first, name, label
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_build(&self) -> Result<(), DescriptorError> {
        let build = &self.build;

        if build.working_directories.is_empty() {
            return Err(DescriptorError::invalid(
                "At least one candidate working directory is required",
            ));
        }
        for dir in &build.working_directories {
            validate_working_directory(dir)?;
        }

        if build.install.is_empty() {
            return Err(DescriptorError::invalid("Build needs an install command"));
        }
        if build.build.is_empty() {
            return Err(DescriptorError::invalid("Build needs a build command"));
        }
        if build
            .install
            .iter()
            .chain(build.build.iter())
            .any(|c| c.trim().is_empty())
        {
            return Err(DescriptorError::invalid("Build commands cannot be empty"));
        }

        validate_relative_path(&build.artifacts.base_directory, "Artifact base directory")?;
        if build.artifacts.files.is_empty() {
            return Err(DescriptorError::invalid("Artifact file list cannot be empty"));
        }
        for path in &build.cache {
            validate_relative_path(path, "Cache path")?;
        }

        Ok(())
    }
}
