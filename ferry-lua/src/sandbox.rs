//! Lua sandbox creation
//!
//! Manifests are evaluated in a restricted Lua state with no filesystem,
//! network, process or module loading capabilities. The only globals beyond
//! the basic libraries are the registered helper modules.

use mlua::{Lua, LuaOptions, Result as LuaResult, StdLib};

use crate::module::ModuleRegistry;

/// Create a sandbox with the built-in manifest modules
///
/// # Example
/// ```no_run
/// use ferry_lua::sandbox::create_sandbox;
///
/// let lua = create_sandbox()?;
/// let table: mlua::Table = lua
///     .load(r#"return descriptor.define({ name = "ChatUI" })"#)
///     .eval()?;
/// let name: String = table.get("name")?;
/// assert_eq!(name, "ChatUI");
/// # Ok::<(), mlua::Error>(())
/// ```
pub fn create_sandbox() -> LuaResult<Lua> {
    create_sandbox_with(&ModuleRegistry::with_defaults())
}

/// Create a sandbox with a custom set of modules
///
/// # Security
/// This sandbox prevents:
/// - Network access
/// - File system access
/// - Process execution
/// - Loading external code via require(), dofile() or loadfile()
pub fn create_sandbox_with(registry: &ModuleRegistry) -> LuaResult<Lua> {
    // Only allow: TABLE, STRING, MATH
    // Explicitly exclude: IO, OS, PACKAGE, DEBUG, COROUTINE
    let lua = unsafe {
        Lua::unsafe_new_with(
            StdLib::TABLE | StdLib::STRING | StdLib::MATH,
            LuaOptions::default(),
        )
    };

    lua.globals().set("require", mlua::Nil)?;
    lua.globals().set("dofile", mlua::Nil)?;
    lua.globals().set("loadfile", mlua::Nil)?;
    lua.globals().set("load", mlua::Nil)?;

    registry.register_all(&lua)?;

    Ok(lua)
}
