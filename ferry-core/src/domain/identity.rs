//! Execution identity domain types
//!
//! Exactly one identity is bound to the build pipeline. It is either declared
//! by the descriptor (with a trust relationship and an enumerated set of
//! permission statements) or referenced by ARN when it is managed elsewhere.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::target::DeploymentTarget;

/// Service principal allowed to assume the build identity by default
pub const DEFAULT_TRUSTED_SERVICE: &str = "amplify.amazonaws.com";

/// Effect of a permission statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => write!(f, "Allow"),
            Effect::Deny => write!(f, "Deny"),
        }
    }
}

impl std::str::FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" | "allow" | "ALLOW" => Ok(Effect::Allow),
            "Deny" | "deny" | "DENY" => Ok(Effect::Deny),
            other => Err(format!("unknown effect '{}'", other)),
        }
    }
}

/// A single permission statement: (effect, actions, resource patterns)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

/// A capability the build identity needs
///
/// Capabilities are the preferred way to grant access: each expands into a
/// statement scoped to a single namespace or secret.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "snake_case")]
pub enum Capability {
    /// Read every parameter under a namespace (without leading slash)
    ReadParameters { namespace: String },
    /// Read a single named secret
    ReadSecret { name: String },
}

impl Capability {
    /// Expand the capability into a statement for a deployment target
    pub fn to_statement(&self, target: &DeploymentTarget) -> PolicyStatement {
        match self {
            Capability::ReadParameters { namespace } => PolicyStatement {
                effect: Effect::Allow,
                actions: vec!["ssm:GetParameter".to_string(), "ssm:GetParameters".to_string()],
                resources: vec![format!(
                    "arn:{}:ssm:{}:{}:parameter/{}/*",
                    target.partition,
                    target.region,
                    target.account,
                    namespace.trim_matches('/')
                )],
            },
            Capability::ReadSecret { name } => PolicyStatement {
                effect: Effect::Allow,
                actions: vec!["secretsmanager:GetSecretValue".to_string()],
                // Secret ARNs carry a random suffix after the name
                resources: vec![format!(
                    "arn:{}:secretsmanager:{}:{}:secret:{}*",
                    target.partition, target.region, target.account, name
                )],
            },
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ReadParameters { namespace } => write!(f, "read parameters /{}/*", namespace),
            Capability::ReadSecret { name } => write!(f, "read secret {}", name),
        }
    }
}

/// The identity the build pipeline runs as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ExecutionIdentity {
    /// Identity declared by this descriptor
    Declared {
        /// Service principal allowed to assume the identity
        trusted_service: String,
        description: Option<String>,
        /// Sorted, de-duplicated statements
        statements: Vec<PolicyStatement>,
    },

    /// Identity managed out-of-band; never mutated by the descriptor
    Referenced { arn: String },
}

impl ExecutionIdentity {
    pub fn strategy(&self) -> &'static str {
        match self {
            ExecutionIdentity::Declared { .. } => "declare",
            ExecutionIdentity::Referenced { .. } => "reference",
        }
    }

    /// Statements attached by this descriptor (empty for referenced identities)
    pub fn statements(&self) -> &[PolicyStatement] {
        match self {
            ExecutionIdentity::Declared { statements, .. } => statements,
            ExecutionIdentity::Referenced { .. } => &[],
        }
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, ExecutionIdentity::Declared { .. })
    }
}
