//! Parameter references

use ferry_core::domain::parameter::ParameterKey;
use mlua::prelude::*;

use super::{MARKER_FIELD, PARAMETER_MARKER};
use crate::module::{FerryModule, ModuleMetadata};

/// `param.get(key)`: reference a value in the shared parameter store
pub struct ParamModule;

impl FerryModule for ParamModule {
    fn id(&self) -> &'static str {
        "param"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let param = lua.create_table()?;

        param.set(
            "get",
            lua.create_function(|lua, key: String| {
                ParameterKey::parse(&key).map_err(|e| LuaError::RuntimeError(e.to_string()))?;

                let marker = lua.create_table()?;
                marker.set(MARKER_FIELD, PARAMETER_MARKER)?;
                marker.set("key", key)?;
                Ok(marker)
            })?,
        )?;

        lua.globals().set(self.id(), param)?;
        Ok(())
    }

    fn stubs(&self) -> String {
        r#"---@meta

---Parameter store references
---Values are resolved once, when the descriptor is composed
---@class param
param = {}

---@class ParameterRef
---@field key string

---Reference a hierarchical key in the shared parameter store
---@param key string Key such as "/MyApp/cognito_user_pool_id"
---@return ParameterRef ref
---
---@usage
---environment = { POOL_ID = param.get("/MyApp/cognito_user_pool_id") }
function param.get(key) end
"#
        .to_string()
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            id: self.id(),
            version: "1.0.0",
            description: "Parameter store references for descriptor manifests",
        }
    }
}
