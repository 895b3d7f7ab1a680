//! Permission grants for declared identities

use mlua::prelude::*;

use super::{GRANT_MARKER, MARKER_FIELD};
use crate::module::{FerryModule, ModuleMetadata};

/// `grant.*`: extra permissions for a declared build identity
///
/// Grants are checked against the allow-list at composition time. The
/// grants needed for the manifest's own parameters and source token are
/// derived automatically and do not need to be listed.
pub struct GrantModule;

impl FerryModule for GrantModule {
    fn id(&self) -> &'static str {
        "grant"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let grant = lua.create_table()?;

        // grant.read_parameters(namespace)
        grant.set(
            "read_parameters",
            lua.create_function(|lua, namespace: String| {
                let marker = lua.create_table()?;
                marker.set(MARKER_FIELD, GRANT_MARKER)?;
                marker.set("capability", "read_parameters")?;
                marker.set("namespace", namespace.trim_matches('/'))?;
                Ok(marker)
            })?,
        )?;

        // grant.read_secret(name)
        grant.set(
            "read_secret",
            lua.create_function(|lua, name: String| {
                let marker = lua.create_table()?;
                marker.set(MARKER_FIELD, GRANT_MARKER)?;
                marker.set("capability", "read_secret")?;
                marker.set("name", name)?;
                Ok(marker)
            })?,
        )?;

        // grant.statement{ effect, actions, resources }
        grant.set(
            "statement",
            lua.create_function(|lua, spec: LuaTable| {
                let marker = lua.create_table()?;
                marker.set(MARKER_FIELD, GRANT_MARKER)?;
                marker.set("capability", "statement")?;
                marker.set("effect", spec.get::<Option<String>>("effect")?)?;
                marker.set("actions", spec.get::<LuaValue>("actions")?)?;
                marker.set("resources", spec.get::<LuaValue>("resources")?)?;
                Ok(marker)
            })?,
        )?;

        lua.globals().set(self.id(), grant)?;
        Ok(())
    }

    fn stubs(&self) -> String {
        r#"---@meta

---Permission grants for a declared build identity
---Grants are validated against an allow-list when the descriptor is composed
---@class grant
grant = {}

---@class Grant

---Read access to every parameter under a namespace
---@param namespace string Namespace such as "MyApp"
---@return Grant grant
function grant.read_parameters(namespace) end

---Read access to a single named secret
---@param name string Secret name
---@return Grant grant
function grant.read_secret(name) end

---@class StatementSpec
---@field effect? "Allow"|"Deny" Defaults to "Allow"
---@field actions string[]
---@field resources string[]

---An explicit permission statement
---@param spec StatementSpec
---@return Grant grant
function grant.statement(spec) end
"#
        .to_string()
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            id: self.id(),
            version: "1.0.0",
            description: "Permission grants for declared build identities",
        }
    }
}
