//! Release topology
//!
//! One release environment per declared branch. Every environment carries
//! its own copy of the shared build spec and environment map, so later
//! changes to one never leak into another.

use ferry_core::domain::build::BuildSpec;
use ferry_core::domain::environment::EnvironmentMap;
use ferry_core::domain::release::{ReleaseBranch, ReleaseEnvironment, ReleaseTopology};
use tracing::info;

pub fn build_topology(
    branches: &[ReleaseBranch],
    build_spec: &BuildSpec,
    environment: &EnvironmentMap,
    auto_branch_deletion: bool,
) -> ReleaseTopology {
    let environments: Vec<ReleaseEnvironment> = branches
        .iter()
        .map(|branch| ReleaseEnvironment {
            branch: branch.clone(),
            build_spec: build_spec.clone(),
            environment: environment.clone(),
        })
        .collect();

    for env in &environments {
        info!(
            "Release environment {} ({}{})",
            env.branch.name,
            env.branch.stage,
            if env.branch.auto_delete { ", auto-delete" } else { "" }
        );
    }

    ReleaseTopology {
        environments,
        auto_branch_deletion,
    }
}
