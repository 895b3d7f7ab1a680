//! Source repository reachability probe
//!
//! Used by diagnostics only. Composition never contacts the repository
//! host, and the probe never reads the source token: a private repository
//! therefore looks the same as a missing one.

use ferry_core::DescriptorError;
use ferry_core::domain::source::SourceBinding;
use ferry_core::dto::repository::RepositorySummary;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::handle_response;

/// Public API of the default repository host
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Read-only reachability check for a source binding
#[derive(Debug, Clone)]
pub struct RepositoryProbe {
    api_base: String,
    client: Client,
}

impl RepositoryProbe {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Check that the repository of a source binding can be reached
    ///
    /// # Errors
    /// Returns `DescriptorError::SourceUnreachable` with a human-readable
    /// reason when the repository cannot be fetched.
    pub async fn check(&self, source: &SourceBinding) -> Result<RepositorySummary, DescriptorError> {
        let url = format!("{}/repos/{}/{}", self.api_base, source.owner, source.repository);
        info!("Probing source repository {}", source.slug());

        self.fetch(&url).await.map_err(|e| {
            warn!("Source repository {} unreachable: {}", source.slug(), e);
            DescriptorError::SourceUnreachable {
                repository: source.slug(),
                reason: describe_failure(&e, &source.token.name),
            }
        })
    }

    async fn fetch(&self, url: &str) -> crate::Result<RepositorySummary> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("ferry/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        handle_response(response).await
    }
}

impl Default for RepositoryProbe {
    fn default() -> Self {
        Self::new(GITHUB_API_URL)
    }
}

/// Turn a client failure into an operator-facing explanation
fn describe_failure(err: &ClientError, secret_name: &str) -> String {
    match err {
        e if e.is_not_found() => format!(
            "repository not found; if it is private, check that the token in secret '{}' grants access to it",
            secret_name
        ),
        e if e.is_forbidden() => {
            "repository host refused the request (rate limited or blocked)".to_string()
        }
        ClientError::RequestFailed(e) => format!("request failed: {}", e),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::domain::source::SecretRef;

    #[test]
    fn test_probe_trims_trailing_slash() {
        let probe = RepositoryProbe::new("https://api.github.com/");
        assert_eq!(probe.api_base(), "https://api.github.com");
        assert_eq!(RepositoryProbe::default().api_base(), GITHUB_API_URL);
    }

    #[test]
    fn test_not_found_mentions_secret() {
        let reason = describe_failure(&ClientError::api_error(404, "Not Found"), "amplify/pat");
        assert!(reason.contains("amplify/pat"));
        assert!(reason.contains("private"));
    }

    #[test]
    fn test_forbidden_reason() {
        let reason = describe_failure(&ClientError::api_error(403, "rate limit"), "amplify/pat");
        assert!(reason.contains("refused"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_source_unreachable() {
        let probe = RepositoryProbe::new("http://127.0.0.1:9");
        let source = SourceBinding {
            owner: "octo".to_string(),
            repository: "chat".to_string(),
            token: SecretRef::new("amplify/pat"),
        };

        let err = probe.check(&source).await.unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::SourceUnreachable { ref repository, .. } if repository == "octo/chat"
        ));
    }
}
