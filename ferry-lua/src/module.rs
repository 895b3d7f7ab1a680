use mlua::prelude::*;

/// Trait for Ferry Lua modules.
///
/// Each module exposes helper functions to descriptor manifests evaluated in
/// the sandbox. Modules must have a unique identifier, used as the global
/// table name.
///
/// # Example
///
/// ```rust
/// use ferry_lua::FerryModule;
/// use mlua::prelude::*;
///
/// struct RegionModule;
///
/// impl FerryModule for RegionModule {
///     fn id(&self) -> &'static str {
///         "region"
///     }
///
///     fn register(&self, lua: &Lua) -> LuaResult<()> {
///         let table = lua.create_table()?;
///         table.set("default", "us-east-1")?;
///         lua.globals().set(self.id(), table)?;
///         Ok(())
///     }
///
///     fn stubs(&self) -> String {
///         "---@meta\n---@class region\nregion = {}\n".to_string()
///     }
/// }
/// ```
pub trait FerryModule: Send + Sync {
    /// Returns the unique identifier for this module.
    ///
    /// The identifier is the global variable name in Lua: if `id()` returns
    /// `"param"`, manifests call `param.get(...)`.
    ///
    /// # Requirements
    /// - Must be a valid Lua identifier
    /// - Must be unique across all modules
    fn id(&self) -> &'static str;

    /// Registers this module's functions into the Lua context.
    ///
    /// # Errors
    /// Returns `LuaError` if registration fails
    fn register(&self, lua: &Lua) -> LuaResult<()>;

    /// Generates Lua Language Server stubs for this module.
    ///
    /// The stub should start with `---@meta` to mark it as a definition file.
    fn stubs(&self) -> String;

    /// Module metadata (version, description)
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            id: self.id(),
            version: "0.1.0",
            description: "",
        }
    }
}

/// Metadata about a Ferry module
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    pub id: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

/// Registry of modules loaded into the manifest sandbox
pub struct ModuleRegistry {
    modules: Vec<Box<dyn FerryModule>>,
}

impl ModuleRegistry {
    /// Creates a new empty module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Creates a registry holding every built-in manifest module
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::modules::DescriptorModule);
        registry.register(crate::modules::ParamModule);
        registry.register(crate::modules::SecretModule);
        registry.register(crate::modules::GrantModule);
        registry
    }

    /// Registers a module
    ///
    /// # Panics
    /// Panics if a module with the same ID is already registered
    pub fn register<M: FerryModule + 'static>(&mut self, module: M) {
        let id = module.id();
        if self.modules.iter().any(|m| m.id() == id) {
            panic!("Module with id '{}' is already registered", id);
        }
        self.modules.push(Box::new(module));
    }

    /// Gets a module by its ID
    pub fn get(&self, id: &str) -> Option<&dyn FerryModule> {
        self.modules
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.as_ref())
    }

    /// Returns all registered modules
    pub fn modules(&self) -> &[Box<dyn FerryModule>] {
        &self.modules
    }

    /// Registers all modules into a Lua context
    ///
    /// # Errors
    /// Returns the first error encountered during registration
    pub fn register_all(&self, lua: &Lua) -> LuaResult<()> {
        for module in &self.modules {
            module.register(lua)?;
        }
        Ok(())
    }

    /// Generates a combined stub file for all registered modules
    pub fn generate_stubs(&self) -> String {
        let mut stubs = String::new();
        for module in &self.modules {
            stubs.push_str(&module.stubs());
            stubs.push_str("\n\n");
        }
        stubs
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
