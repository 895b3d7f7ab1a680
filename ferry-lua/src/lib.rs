//! Ferry Lua Infrastructure
//!
//! Descriptor manifests are written as Lua tables and evaluated in a
//! sandbox without I/O. This crate provides:
//! - Module trait and registry for the helpers exposed to manifests
//! - The helper modules themselves (`descriptor`, `param`, `secret`, `grant`)
//! - The sandbox used to evaluate manifests
//! - The parser turning the evaluated table into a `DescriptorManifest`

pub mod module;
pub mod modules;
pub mod parser;
pub mod sandbox;

pub use module::{FerryModule, ModuleMetadata, ModuleRegistry};
pub use modules::{DescriptorModule, GrantModule, ParamModule, SecretModule};
pub use parser::parse_descriptor;
pub use sandbox::create_sandbox;

pub use ferry_core::domain::manifest::DescriptorManifest;
