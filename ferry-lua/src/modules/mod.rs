//! Helper modules exposed to descriptor manifests
//!
//! Helpers never resolve anything: `param.get` and `secret.ref` return marker
//! tables that the parser turns into typed references. Resolution happens
//! later, during composition.

pub mod descriptor;
pub mod grant;
pub mod param;
pub mod secret;

pub use descriptor::DescriptorModule;
pub use grant::GrantModule;
pub use param::ParamModule;
pub use secret::SecretModule;

/// Field identifying a marker table produced by a helper
pub const MARKER_FIELD: &str = "__ferry";

/// Marker kinds
pub const PARAMETER_MARKER: &str = "parameter";
pub const SECRET_MARKER: &str = "secret";
pub const GRANT_MARKER: &str = "grant";
