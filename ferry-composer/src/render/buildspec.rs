//! Build specification document

use ferry_core::domain::build::{BuildSpec, PhaseKind};
use serde::Serialize;

use super::RenderError;

const BUILDSPEC_VERSION: u32 = 1;

#[derive(Serialize)]
struct Document<'a> {
    version: u32,
    frontend: Frontend<'a>,
}

#[derive(Serialize)]
struct Frontend<'a> {
    phases: Phases<'a>,
    artifacts: Artifacts<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache: Option<Cache<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Phases<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pre_build: Option<Commands<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<Commands<'a>>,
}

#[derive(Serialize)]
struct Commands<'a> {
    commands: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Artifacts<'a> {
    base_directory: &'a str,
    files: &'a [String],
}

#[derive(Serialize)]
struct Cache<'a> {
    paths: &'a [String],
}

/// Render a build spec as YAML
pub fn render_buildspec(spec: &BuildSpec) -> Result<String, RenderError> {
    let commands = |kind| {
        spec.phase(kind)
            .filter(|phase| !phase.commands.is_empty())
            .map(|phase| Commands {
                commands: &phase.commands,
            })
    };

    let document = Document {
        version: BUILDSPEC_VERSION,
        frontend: Frontend {
            phases: Phases {
                pre_build: commands(PhaseKind::PreBuild),
                build: commands(PhaseKind::Build),
            },
            artifacts: Artifacts {
                base_directory: &spec.artifacts.base_directory,
                files: &spec.artifacts.files,
            },
            cache: (!spec.cache_paths.is_empty()).then_some(Cache {
                paths: &spec.cache_paths,
            }),
        },
    };

    Ok(serde_yaml::to_string(&document)?)
}
