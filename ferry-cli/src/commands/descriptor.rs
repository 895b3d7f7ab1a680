//! Descriptor command handlers
//!
//! Validation, synthesis, description and output listing for a manifest.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use ferry_composer::{Composer, compute_outputs, render_buildspec, render_template};
use ferry_core::domain::application::{ApplicationDescriptor, ApplicationOutputs};
use ferry_core::domain::build::{FsLayoutProbe, LayoutProbe, PhaseKind, StaticLayoutProbe};
use ferry_core::domain::environment::EnvOrigin;
use ferry_core::domain::identity::ExecutionIdentity;
use ferry_core::domain::manifest::DescriptorManifest;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

const TEMPLATE_FILE: &str = "template.json";
const BUILDSPEC_FILE: &str = "buildspec.yml";

/// Where working-directory discovery looks
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Local checkout of the source repository
    #[arg(long, default_value = ".")]
    source_root: String,

    /// Treat these directories as present instead of inspecting a checkout
    #[arg(long = "assume-dir", conflicts_with = "source_root")]
    assume_dirs: Vec<String>,
}

impl LayoutArgs {
    fn probe(&self) -> Result<Arc<dyn LayoutProbe>> {
        if !self.assume_dirs.is_empty() {
            return Ok(Arc::new(StaticLayoutProbe::new(self.assume_dirs.iter().cloned())));
        }

        let root = Path::new(&self.source_root);
        if !root.is_dir() {
            anyhow::bail!("Source root '{}' is not a directory", self.source_root);
        }
        Ok(Arc::new(FsLayoutProbe::new(root)))
    }
}

/// Read and parse a manifest file
fn load_manifest(path: &str) -> Result<DescriptorManifest> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest file: {}", path))?;

    ferry_lua::parse_descriptor(&source)
        .with_context(|| format!("Failed to parse descriptor manifest {}", path))
}

async fn compose(
    path: &str,
    layout: &LayoutArgs,
    config: &Config,
) -> Result<(ApplicationDescriptor, ApplicationOutputs)> {
    config.validate(true)?;
    let manifest = load_manifest(path)?;

    let composer = Composer::new(config.parameter_store()?, layout.probe()?, config.target()?);
    let composed = composer
        .compose_with_outputs(&manifest)
        .await
        .with_context(|| format!("Failed to compose descriptor '{}'", manifest.name))?;

    Ok(composed)
}

/// Validate a manifest without resolving anything
pub fn validate(path: &str) -> Result<()> {
    let manifest = load_manifest(path)?;

    println!("{}", "✓ Descriptor is valid".green().bold());
    println!("  Name:       {}", manifest.name.bold());
    println!("  Platform:   {}", manifest.platform.to_string().dimmed());
    println!(
        "  Parameters: {}",
        manifest.parameter_keys().len().to_string().cyan()
    );
    println!(
        "  Branches:   {}",
        manifest
            .branches
            .iter()
            .map(|b| format!("{} ({})", b.name, b.stage))
            .collect::<Vec<_>>()
            .join(", ")
            .dimmed()
    );

    Ok(())
}

/// Compose and render the deployment documents
pub async fn synth(
    path: &str,
    layout: &LayoutArgs,
    output: Option<&str>,
    config: &Config,
) -> Result<()> {
    let (descriptor, outputs) = compose(path, layout, config).await?;

    let template = render_template(&descriptor, &outputs).context("Failed to render template")?;
    let buildspec =
        render_buildspec(&descriptor.build_spec).context("Failed to render build spec")?;

    match output {
        Some(dir) => {
            let dir = Path::new(dir);
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {:?}", dir))?;

            for (name, content) in [(TEMPLATE_FILE, &template), (BUILDSPEC_FILE, &buildspec)] {
                let file = dir.join(name);
                fs::write(&file, content)
                    .with_context(|| format!("Failed to write {:?}", file))?;
                info!("Wrote {}", file.display());
                eprintln!("  {} {}", "Created".green(), file.display());
            }
        }
        None => print!("{}", template),
    }

    Ok(())
}

/// Print the composed descriptor
pub async fn describe(path: &str, layout: &LayoutArgs, json: bool, config: &Config) -> Result<()> {
    let (descriptor, outputs) = compose(path, layout, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    println!("{}", descriptor.name.bold());
    if let Some(description) = &descriptor.description {
        println!("  {}", description.dimmed());
    }
    println!(
        "  Target:   {}/{}/{}",
        descriptor.target.partition, descriptor.target.region, descriptor.target.account
    );
    println!("  Platform: {}", descriptor.platform);
    println!("  Source:   {}", descriptor.source.repository_url().cyan());
    println!("  Token:    {}", descriptor.source.token.to_string().dimmed());
    println!("  App id:   {}", outputs.app_id.cyan());

    println!();
    println!("{}", "Resolved parameters:".bold());
    if descriptor.resolved.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for key in descriptor.resolved.keys() {
        println!("  - {}", key);
    }

    println!();
    println!("{}", "Identity:".bold());
    match &descriptor.identity {
        ExecutionIdentity::Declared {
            trusted_service,
            statements,
            ..
        } => {
            println!("  declared, trusted by {}", trusted_service.cyan());
            for stmt in statements {
                println!(
                    "  - {} {} on {}",
                    stmt.effect,
                    stmt.actions.join(", "),
                    stmt.resources.join(", ").dimmed()
                );
            }
        }
        ExecutionIdentity::Referenced { arn } => println!("  referenced {}", arn.cyan()),
    }

    println!();
    println!("{}", "Build:".bold());
    let selection = &descriptor.build_spec.working_directory;
    for (i, candidate) in selection.candidates.iter().enumerate() {
        let marker = if i == selection.index {
            "selected".green()
        } else if i < selection.index {
            "missing".yellow()
        } else {
            "not tried".dimmed()
        };
        println!("  {} [{}]", candidate, marker);
    }
    for kind in [PhaseKind::PreBuild, PhaseKind::Build] {
        if let Some(phase) = descriptor.build_spec.phase(kind) {
            println!("  {}: {}", kind, phase.commands.join(" && ").dimmed());
        }
    }
    println!("  artifacts: {}", descriptor.build_spec.artifacts.base_directory);

    println!();
    println!("{}", "Environment:".bold());
    for (name, entry) in descriptor.environment.iter() {
        let origin = match &entry.origin {
            EnvOrigin::Literal => "literal".to_string(),
            EnvOrigin::Parameter { key } => key.to_string(),
            EnvOrigin::Alias { canonical } => format!("alias of {}", canonical),
        };
        println!("  {} = {} {}", name.cyan(), entry.value, format!("({})", origin).dimmed());
    }

    println!();
    println!("{}", "Branches:".bold());
    for env in &descriptor.topology.environments {
        let url = outputs
            .branch_urls
            .get(&env.branch.name)
            .map(String::as_str)
            .unwrap_or_default();
        let auto_delete = if env.branch.auto_delete { " auto-delete" } else { "" };
        println!(
            "  {} {}{} {}",
            env.branch.name.bold(),
            env.branch.stage,
            auto_delete.yellow(),
            url.dimmed()
        );
    }

    Ok(())
}

/// Print the outputs of a manifest
///
/// Outputs depend only on the target, the name and the branches, so no
/// parameter is resolved.
pub fn outputs(path: &str, json: bool, config: &Config) -> Result<()> {
    config.validate(false)?;
    let manifest = load_manifest(path)?;
    let target = config.target()?;

    let outputs = compute_outputs(
        &target,
        &manifest.name,
        manifest.branches.iter().map(|b| b.name.as_str()),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    println!("  AppId:         {}", outputs.app_id.cyan());
    println!("  DefaultDomain: {}", outputs.default_domain.cyan());
    for (branch, url) in &outputs.branch_urls {
        println!("  {:<14} {}", format!("{}:", branch), url);
    }

    Ok(())
}
