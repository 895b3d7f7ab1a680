//! Init command handlers
//!
//! Generates editor support for writing manifests: `.luarc.json` and stub
//! files for the helper modules.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use ferry_lua::{FerryModule, ModuleRegistry};
use std::fs;
use std::path::Path;

/// Init subcommands
#[derive(Subcommand)]
pub enum InitCommands {
    /// Generate Lua development files (.luarc.json and stubs)
    Lua {
        /// Output directory for generated files
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Generate only .luarc.json
        #[arg(long, conflicts_with = "stubs_only")]
        config_only: bool,

        /// Generate only stub files
        #[arg(long)]
        stubs_only: bool,
    },
}

/// Handle init commands
pub fn handle_init_command(command: InitCommands) -> Result<()> {
    match command {
        InitCommands::Lua {
            output,
            config_only,
            stubs_only,
        } => generate_lua_dev_files(Path::new(&output), config_only, stubs_only),
    }
}

fn generate_lua_dev_files(output_path: &Path, config_only: bool, stubs_only: bool) -> Result<()> {
    let registry = ModuleRegistry::with_defaults();

    if !stubs_only {
        generate_luarc_json(output_path, &registry)?;
    }
    if !config_only {
        generate_stub_files(output_path, &registry)?;
    }

    println!("{}", "✓ Lua development files generated!".green().bold());
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Install Lua Language Server in your editor");
    println!("  2. Write a manifest returning descriptor.define {{ ... }}");
    println!("  3. Check it with {}", "ferry validate <manifest>".cyan());

    Ok(())
}

/// Render `.luarc.json` with every registered module as a known global
fn luarc_json(registry: &ModuleRegistry) -> Result<String> {
    let globals: Vec<&str> = registry.modules().iter().map(|m| m.id()).collect();

    let luarc = serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/sumneko/vscode-lua/master/setting/schema.json",
        "runtime": { "version": "Lua 5.4" },
        "diagnostics": { "globals": globals },
        "workspace": { "library": [".ferry/stubs"], "checkThirdParty": false },
        "completion": { "callSnippet": "Both" },
    });

    let mut content = serde_json::to_string_pretty(&luarc)?;
    content.push('\n');
    Ok(content)
}

fn generate_luarc_json(output_path: &Path, registry: &ModuleRegistry) -> Result<()> {
    let luarc_path = output_path.join(".luarc.json");

    fs::create_dir_all(output_path)
        .with_context(|| format!("Failed to create output directory {:?}", output_path))?;
    fs::write(&luarc_path, luarc_json(registry)?)
        .with_context(|| format!("Failed to write .luarc.json to {:?}", luarc_path))?;

    println!("  {} .luarc.json", "Created".green());
    Ok(())
}

/// One stub file per module, generated from the module implementations
fn generate_stub_files(output_path: &Path, registry: &ModuleRegistry) -> Result<()> {
    let stubs_dir = output_path.join(".ferry").join("stubs");
    fs::create_dir_all(&stubs_dir)
        .with_context(|| format!("Failed to create stubs directory at {:?}", stubs_dir))?;

    for module in registry.modules() {
        let stub_path = stubs_dir.join(format!("{}.lua", module.id()));
        fs::write(&stub_path, module.stubs())
            .with_context(|| format!("Failed to write stub file {:?}", stub_path))?;

        println!("  {} {}.lua", "Created".green(), module.id());
    }

    println!(
        "  {} in {}",
        "Stubs ready".green(),
        stubs_dir.display().to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luarc_lists_module_globals() {
        let content = luarc_json(&ModuleRegistry::with_defaults()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let globals = value["diagnostics"]["globals"].as_array().unwrap();

        for id in ["descriptor", "param", "secret", "grant"] {
            assert!(globals.iter().any(|g| g == id), "missing global {}", id);
        }
    }
}
