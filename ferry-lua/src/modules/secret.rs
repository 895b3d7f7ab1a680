//! Secret references

use mlua::prelude::*;

use super::{MARKER_FIELD, SECRET_MARKER};
use crate::module::{FerryModule, ModuleMetadata};

/// `secret.ref(name)`: reference a named secret without reading it
pub struct SecretModule;

impl FerryModule for SecretModule {
    fn id(&self) -> &'static str {
        "secret"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let secret = lua.create_table()?;

        secret.set(
            "ref",
            lua.create_function(|lua, name: String| {
                if name.trim().is_empty() {
                    return Err(LuaError::RuntimeError(
                        "secret.ref requires a secret name".to_string(),
                    ));
                }

                let marker = lua.create_table()?;
                marker.set(MARKER_FIELD, SECRET_MARKER)?;
                marker.set("name", name)?;
                Ok(marker)
            })?,
        )?;

        lua.globals().set(self.id(), secret)?;
        Ok(())
    }

    fn stubs(&self) -> String {
        r#"---@meta

---Secret store references
---Only the name is recorded; the build platform resolves the value
---@class secret
secret = {}

---@class SecretRef
---@field name string

---Reference a named secret
---@param name string Secret name such as "amplify/pat"
---@return SecretRef ref
---
---@usage
---source = { owner = "me", repository = "app", token = secret.ref("amplify/pat") }
function secret.ref(name) end
"#
        .to_string()
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            id: self.id(),
            version: "1.0.0",
            description: "Secret references for source credentials",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_ref_returns_marker() {
        let lua = Lua::new();
        SecretModule.register(&lua).unwrap();

        let marker: LuaTable = lua.load(r#"return secret.ref("amplify/pat")"#).eval().unwrap();
        let kind: String = marker.get(MARKER_FIELD).unwrap();
        let name: String = marker.get("name").unwrap();
        assert_eq!(kind, SECRET_MARKER);
        assert_eq!(name, "amplify/pat");
    }

    #[test]
    fn test_secret_ref_requires_name() {
        let lua = Lua::new();
        SecretModule.register(&lua).unwrap();

        let result: LuaResult<LuaTable> = lua.load(r#"return secret.ref("")"#).eval();
        assert!(result.is_err());
    }
}
