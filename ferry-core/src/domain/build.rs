//! Build pipeline domain types
//!
//! A build spec is an ordered list of phases (pre-build, then build), an
//! artifact location and cache paths. Artifact and cache paths are stored
//! already joined onto the working directory selected during pre-build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DescriptorError;

/// Build phase kind, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    PreBuild,
    Build,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::PreBuild => write!(f, "preBuild"),
            PhaseKind::Build => write!(f, "build"),
        }
    }
}

/// A phase and its shell commands, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPhase {
    pub kind: PhaseKind,
    pub commands: Vec<String>,
}

/// Where the build output lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    pub base_directory: String,
    pub files: Vec<String>,
}

/// Outcome of working-directory discovery
///
/// Records every candidate that was considered and which one was picked, so
/// the choice can be reported later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySelection {
    pub candidates: Vec<String>,
    pub selected: String,
    /// Position of `selected` in `candidates`
    pub index: usize,
}

impl DirectorySelection {
    /// True when a fallback candidate was used instead of the first one
    pub fn used_fallback(&self) -> bool {
        self.index > 0
    }
}

/// Declarative build plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub working_directory: DirectorySelection,
    pub phases: Vec<BuildPhase>,
    pub artifacts: ArtifactLocation,
    pub cache_paths: Vec<String>,
}

impl BuildSpec {
    pub fn phase(&self, kind: PhaseKind) -> Option<&BuildPhase> {
        self.phases.iter().find(|p| p.kind == kind)
    }
}

/// Trait for checking the physical layout of the hosted repository
///
/// Paths are relative to the repository root.
pub trait LayoutProbe: Send + Sync {
    /// Returns true if `relative` is an existing directory
    fn is_dir(&self, relative: &str) -> bool;
}

/// Layout probe backed by a local checkout
#[derive(Debug, Clone)]
pub struct FsLayoutProbe {
    root: PathBuf,
}

impl FsLayoutProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LayoutProbe for FsLayoutProbe {
    fn is_dir(&self, relative: &str) -> bool {
        self.root.join(relative).is_dir()
    }
}

/// Layout probe over a fixed set of known directories
///
/// Useful for dry runs where no checkout is available. The root (`.`) is
/// always present.
#[derive(Debug, Clone, Default)]
pub struct StaticLayoutProbe {
    directories: BTreeSet<String>,
}

impl StaticLayoutProbe {
    pub fn new<I, S>(directories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directories: directories
                .into_iter()
                .map(|d| normalize_relative(&d.into()))
                .collect(),
        }
    }
}

impl LayoutProbe for StaticLayoutProbe {
    fn is_dir(&self, relative: &str) -> bool {
        let relative = normalize_relative(relative);
        relative == "." || self.directories.contains(&relative)
    }
}

/// Validate a repository-relative path
///
/// Rejects absolute paths and any `..` segment so a path can never escape
/// the working directory it is joined onto.
pub fn validate_relative_path(path: &str, what: &str) -> Result<(), DescriptorError> {
    if path.trim().is_empty() {
        return Err(DescriptorError::invalid(format!("{} cannot be empty", what)));
    }

    if path.starts_with('/') {
        return Err(DescriptorError::invalid(format!(
            "{} '{}' must be relative",
            what, path
        )));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(DescriptorError::invalid(format!(
            "{} '{}' must not contain '..'",
            what, path
        )));
    }

    Ok(())
}

/// Validate a candidate working directory
///
/// The selected directory is spliced into a `cd` shell command, so only
/// letters, digits and `._@/-` are allowed on top of the relative path rules.
pub fn validate_working_directory(path: &str) -> Result<(), DescriptorError> {
    validate_relative_path(path, "Working directory")?;

    let safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '/' | '-');
    if let Some(bad) = path.chars().find(|c| !safe(*c)) {
        return Err(DescriptorError::invalid(format!(
            "Working directory '{}' contains unsupported character {:?}",
            path, bad
        )));
    }

    Ok(())
}

/// Join a relative path onto a working directory
///
/// `join_relative("frontend/chat-app", ".next")` is `frontend/chat-app/.next`;
/// joining onto `.` returns the path unchanged.
pub fn join_relative(base: &str, path: &str) -> String {
    let base = normalize_relative(base);
    let path = normalize_relative(path);

    match (base.as_str(), path.as_str()) {
        (".", _) => path,
        (_, ".") => base,
        _ => format!("{}/{}", base, path),
    }
}

fn normalize_relative(path: &str) -> String {
    let parts: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
