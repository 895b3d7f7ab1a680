//! The `descriptor` helper module

use mlua::prelude::*;

use crate::module::{FerryModule, ModuleMetadata};

/// `descriptor.define` and `descriptor.branch`
///
/// Both are conveniences: `define` returns its argument and `branch` builds
/// the branch table, so plain tables work just as well.
pub struct DescriptorModule;

impl FerryModule for DescriptorModule {
    fn id(&self) -> &'static str {
        "descriptor"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let descriptor = lua.create_table()?;

        descriptor.set(
            "define",
            lua.create_function(|_, definition: LuaTable| Ok(definition))?,
        )?;

        descriptor.set(
            "branch",
            lua.create_function(
                |lua, (name, stage, opts): (String, String, Option<LuaTable>)| {
                    let branch = lua.create_table()?;
                    branch.set("name", name)?;
                    branch.set("stage", stage)?;
                    if let Some(opts) = opts {
                        branch.set("auto_build", opts.get::<Option<bool>>("auto_build")?)?;
                        branch.set("auto_delete", opts.get::<Option<bool>>("auto_delete")?)?;
                    }
                    Ok(branch)
                },
            )?,
        )?;

        lua.globals().set(self.id(), descriptor)?;
        Ok(())
    }

    fn stubs(&self) -> String {
        r#"---@meta

---Descriptor definition helpers
---@class descriptor
descriptor = {}

---@class ArtifactSpec
---@field base_directory string Relative to the selected working directory
---@field files? string[] Defaults to { "**/*" }

---@class BuildSpec
---@field working_directories? string[] Candidates tried in order, defaults to { "." }
---@field install string|string[]
---@field build string|string[]
---@field artifacts ArtifactSpec
---@field cache? string[] Relative to the selected working directory

---@class IdentitySpec
---@field strategy? "declare"|"reference" Defaults to "declare"
---@field trusted_service? string Defaults to "amplify.amazonaws.com"
---@field description? string
---@field grants? Grant[]
---@field arn? string Required for "reference"

---@class SourceSpec
---@field owner string
---@field repository string
---@field token SecretRef

---@class BranchSpec
---@field name string
---@field stage "PRODUCTION"|"STAGING"|"BETA"|"DEVELOPMENT"|"EXPERIMENTAL"|"PULL_REQUEST"
---@field auto_build? boolean Defaults to true
---@field auto_delete? boolean Defaults to false

---@class Descriptor
---@field name string
---@field description? string
---@field platform? "WEB"|"WEB_COMPUTE" Defaults to "WEB_COMPUTE"
---@field identity IdentitySpec
---@field source SourceSpec
---@field build BuildSpec
---@field environment? table<string, string|number|boolean|ParameterRef>
---@field legacy_environment? table<string, string> Legacy name -> canonical name
---@field auto_branch_deletion? boolean Defaults to true
---@field branches BranchSpec[]

---Define a descriptor (returns the table unchanged)
---@param definition Descriptor
---@return Descriptor
function descriptor.define(definition) end

---Build a branch entry
---@param name string
---@param stage string
---@param opts? { auto_build?: boolean, auto_delete?: boolean }
---@return BranchSpec
function descriptor.branch(name, stage, opts) end
"#
        .to_string()
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            id: self.id(),
            version: "1.0.0",
            description: "Descriptor definition helpers",
        }
    }
}
