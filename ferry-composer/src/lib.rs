//! Ferry Composer
//!
//! Composes a descriptor manifest into an application descriptor and renders
//! it for the deployment platform.
//!
//! Composition runs one step at a time, and a failing step stops the pass:
//! 1. Parameter resolution (`resolver`)
//! 2. Identity binding, checked against the permission allow-list (`identity`, `policy`)
//! 3. Source binding (`source`)
//! 4. Build specification with working-directory discovery (`build`)
//! 5. Environment injection (`environment`)
//! 6. Release topology (`release`)
//! 7. Output export (`outputs`)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ferry_composer::Composer;
//! use ferry_core::domain::build::FsLayoutProbe;
//! use ferry_core::domain::parameter::MemoryParameterStore;
//! use ferry_core::domain::target::DeploymentTarget;
//!
//! # async fn run(manifest: ferry_core::domain::manifest::DescriptorManifest) -> ferry_core::Result<()> {
//! let composer = Composer::new(
//!     Arc::new(MemoryParameterStore::new().with_value("/ns/pool_id", "p1")),
//!     Arc::new(FsLayoutProbe::new(".")),
//!     DeploymentTarget::new("aws", "us-east-1", "123456789012"),
//! );
//! let (descriptor, outputs) = composer.compose_with_outputs(&manifest).await?;
//! println!("{} -> {}", descriptor.name, outputs.default_domain);
//! # Ok(())
//! # }
//! ```

pub mod build;
mod composer;
pub mod environment;
pub mod identity;
pub mod outputs;
pub mod policy;
pub mod release;
pub mod render;
pub mod resolver;
pub mod source;

pub use composer::Composer;
pub use outputs::{compute_outputs, export_outputs};
pub use render::{RenderError, render_buildspec, render_template};
