//! Source binding domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a secret held in a secret store
///
/// Only the name is ever held; the value is resolved by the build platform
/// when the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SecretRef {
    pub name: String,
}

impl SecretRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Dynamic reference the deployment platform resolves at apply time
    pub fn dynamic_reference(&self) -> String {
        format!("{{{{resolve:secretsmanager:{}:SecretString:::}}}}", self.name)
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secret:{}", self.name)
    }
}

/// Where the application source lives and how to authenticate fetches
///
/// Reachability is not checked while composing; an unreachable repository or
/// bad credential surfaces as a build provisioning failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBinding {
    pub owner: String,
    pub repository: String,
    pub token: SecretRef,
}

impl SourceBinding {
    /// Browser URL of the repository
    pub fn repository_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repository)
    }

    /// `owner/repository` slug
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_reference() {
        let secret = SecretRef::new("amplify/pat");
        assert_eq!(
            secret.dynamic_reference(),
            "{{resolve:secretsmanager:amplify/pat:SecretString:::}}"
        );
    }

    #[test]
    fn test_repository_url() {
        let source = SourceBinding {
            owner: "Masterpitan".to_string(),
            repository: "llm-assistant-project".to_string(),
            token: SecretRef::new("amplify/pat"),
        };
        assert_eq!(
            source.repository_url(),
            "https://github.com/Masterpitan/llm-assistant-project"
        );
        assert_eq!(source.slug(), "Masterpitan/llm-assistant-project");
    }
}
