//! Build pipeline specification
//!
//! Picks the working directory from an ordered list of candidates and lays
//! out the phases, artifacts and cache around it.

use ferry_core::domain::build::{
    ArtifactLocation, BuildPhase, BuildSpec, DirectorySelection, LayoutProbe, PhaseKind,
    join_relative, validate_working_directory,
};
use ferry_core::domain::manifest::BuildManifest;
use ferry_core::{DescriptorError, Result};
use tracing::{debug, info, warn};

/// Select the first candidate directory that exists
///
/// # Errors
/// Returns `InvalidDescriptor` for a candidate that is not a plain relative
/// path and `DirectoryLayoutMismatch` listing every candidate when none
/// exist.
pub fn discover_working_directory(
    candidates: &[String],
    probe: &dyn LayoutProbe,
) -> Result<DirectorySelection> {
    for dir in candidates {
        validate_working_directory(dir)?;
    }

    let found = candidates.iter().enumerate().find(|(_, dir)| {
        let exists = probe.is_dir(dir);
        debug!("Working directory candidate {}: {}", dir, if exists { "found" } else { "absent" });
        exists
    });

    match found {
        Some((index, selected)) => {
            let selection = DirectorySelection {
                candidates: candidates.to_vec(),
                selected: selected.clone(),
                index,
            };
            if selection.used_fallback() {
                warn!(
                    "Working directory {} not found, falling back to {}",
                    candidates[0], selection.selected
                );
            }
            Ok(selection)
        }
        None => Err(DescriptorError::DirectoryLayoutMismatch {
            candidates: candidates.to_vec(),
        }),
    }
}

/// Build the pipeline specification for a manifest
///
/// Pre-build enters the selected directory before installing, so artifact
/// and cache paths are joined onto it.
pub fn build_spec(manifest: &BuildManifest, probe: &dyn LayoutProbe) -> Result<BuildSpec> {
    let selection = discover_working_directory(&manifest.working_directories, probe)?;
    let workdir = selection.selected.as_str();

    let mut pre_build = Vec::with_capacity(manifest.install.len() + 1);
    if join_relative(workdir, ".") != "." {
        pre_build.push(format!("cd {}", workdir));
    }
    pre_build.extend(manifest.install.iter().cloned());

    let spec = BuildSpec {
        phases: vec![
            BuildPhase {
                kind: PhaseKind::PreBuild,
                commands: pre_build,
            },
            BuildPhase {
                kind: PhaseKind::Build,
                commands: manifest.build.clone(),
            },
        ],
        artifacts: ArtifactLocation {
            base_directory: join_relative(workdir, &manifest.artifacts.base_directory),
            files: manifest.artifacts.files.clone(),
        },
        cache_paths: manifest
            .cache
            .iter()
            .map(|path| join_relative(workdir, path))
            .collect(),
        working_directory: selection,
    };

    info!(
        "Build spec uses working directory {} (artifacts in {})",
        spec.working_directory.selected, spec.artifacts.base_directory
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::domain::build::StaticLayoutProbe;

    fn manifest(candidates: &[&str]) -> BuildManifest {
        BuildManifest {
            working_directories: candidates.iter().map(|s| s.to_string()).collect(),
            install: vec!["npm ci".to_string()],
            build: vec!["npm run build".to_string()],
            artifacts: ArtifactLocation {
                base_directory: ".next".to_string(),
                files: vec!["**/*".to_string()],
            },
            cache: vec!["node_modules/**/*".to_string()],
        }
    }

    #[test]
    fn test_first_candidate_wins() {
        let probe = StaticLayoutProbe::new(["frontend/chat-app", "chat-app"]);
        let candidates = vec!["frontend/chat-app".to_string(), "chat-app".to_string()];

        let selection = discover_working_directory(&candidates, &probe).unwrap();
        assert_eq!(selection.selected, "frontend/chat-app");
        assert!(!selection.used_fallback());
    }

    #[test]
    fn test_falls_back_to_second_candidate() {
        let probe = StaticLayoutProbe::new(["chat-app"]);
        let spec = build_spec(&manifest(&["frontend/chat-app", "chat-app"]), &probe).unwrap();

        assert_eq!(spec.working_directory.selected, "chat-app");
        assert_eq!(spec.working_directory.index, 1);
        assert_eq!(
            spec.working_directory.candidates,
            vec!["frontend/chat-app", "chat-app"]
        );
        assert_eq!(
            spec.phase(PhaseKind::PreBuild).unwrap().commands,
            vec!["cd chat-app", "npm ci"]
        );
    }

    #[test]
    fn test_no_candidate_is_layout_mismatch() {
        let probe = StaticLayoutProbe::new(["backend"]);
        let err = build_spec(&manifest(&["frontend/chat-app", "chat-app"]), &probe).unwrap_err();

        match err {
            DescriptorError::DirectoryLayoutMismatch { candidates } => {
                assert_eq!(candidates, vec!["frontend/chat-app", "chat-app"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_paths_joined_onto_working_directory() {
        let probe = StaticLayoutProbe::new(["frontend/chat-app"]);
        let spec = build_spec(&manifest(&["frontend/chat-app"]), &probe).unwrap();

        assert_eq!(spec.artifacts.base_directory, "frontend/chat-app/.next");
        assert_eq!(spec.cache_paths, vec!["frontend/chat-app/node_modules/**/*"]);
        assert_eq!(
            spec.phase(PhaseKind::Build).unwrap().commands,
            vec!["npm run build"]
        );
    }

    #[test]
    fn test_unsafe_working_directory_never_reaches_shell() {
        let probe = StaticLayoutProbe::new(["my app", "chat-app"]);
        let err = build_spec(&manifest(&["my app", "chat-app"]), &probe).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidDescriptor(_)));

        let probe = StaticLayoutProbe::new(["app;touch pwned"]);
        let err = build_spec(&manifest(&["app;touch pwned"]), &probe).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_root_working_directory_has_no_cd() {
        let probe = StaticLayoutProbe::default();
        let spec = build_spec(&manifest(&["."]), &probe).unwrap();

        assert_eq!(spec.phase(PhaseKind::PreBuild).unwrap().commands, vec!["npm ci"]);
        assert_eq!(spec.artifacts.base_directory, ".next");
    }
}
