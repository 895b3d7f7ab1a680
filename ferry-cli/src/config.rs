//! Configuration module
//!
//! Settings shared by every command: the deployment target and where
//! parameter values are read from.

use anyhow::{Context, Result, bail};
use ferry_client::{FileParameterStore, HttpParameterStore};
use ferry_core::domain::parameter::ParameterStore;
use ferry_core::domain::target::DeploymentTarget;
use std::sync::Arc;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the parameter store service
    pub store_url: Option<String>,

    /// Local JSON snapshot of parameter values
    pub parameters_file: Option<String>,

    pub account: Option<String>,
    pub region: Option<String>,
    pub partition: String,

    /// Timeout for a single parameter store request
    pub store_timeout_secs: u64,
}

impl Config {
    /// Validate the configuration
    ///
    /// `needs_store` is set for commands that resolve parameters; those need
    /// exactly one parameter source.
    pub fn validate(&self, needs_store: bool) -> Result<()> {
        self.target()?;

        if let Some(url) = &self.store_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("Parameter store URL '{}' must start with http:// or https://", url);
            }
        }

        if needs_store {
            match (&self.store_url, &self.parameters_file) {
                (Some(_), Some(_)) => {
                    bail!("Set either --store-url or --parameters-file, not both")
                }
                (None, None) => bail!(
                    "No parameter source configured; set --store-url (FERRY_PARAMETER_STORE_URL) or --parameters-file (FERRY_PARAMETERS_FILE)"
                ),
                _ => {}
            }
        }

        Ok(())
    }

    /// Deployment target from the configured coordinates
    pub fn target(&self) -> Result<DeploymentTarget> {
        let account = self
            .account
            .as_deref()
            .context("No account configured; set --account or FERRY_ACCOUNT")?;
        let region = self
            .region
            .as_deref()
            .context("No region configured; set --region or FERRY_REGION")?;

        let target = DeploymentTarget::new(self.partition.as_str(), region, account);
        target.validate()?;
        Ok(target)
    }

    /// Build the configured parameter store
    pub fn parameter_store(&self) -> Result<Arc<dyn ParameterStore>> {
        if let Some(path) = &self.parameters_file {
            let store = FileParameterStore::load(path)
                .with_context(|| format!("Failed to load parameters from {}", path))?;
            return Ok(Arc::new(store));
        }

        let url = self
            .store_url
            .as_deref()
            .context("No parameter store URL configured")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.store_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Arc::new(HttpParameterStore::with_client(url, client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            store_url: Some("http://localhost:8700".to_string()),
            parameters_file: None,
            account: Some("123456789012".to_string()),
            region: Some("us-east-1".to_string()),
            partition: "aws".to_string(),
            store_timeout_secs: 10,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate(true).is_ok());
        assert_eq!(config().target().unwrap().account, "123456789012");
    }

    #[test]
    fn test_rejects_bad_url_scheme() {
        let mut config = config();
        config.store_url = Some("localhost:8700".to_string());
        assert!(config.validate(true).is_err());
    }

    #[test]
    fn test_rejects_bad_account() {
        let mut config = config();
        config.account = Some("1234".to_string());
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_requires_region() {
        let mut config = config();
        config.region = None;
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_requires_exactly_one_parameter_source() {
        let mut both = config();
        both.parameters_file = Some("params.json".to_string());
        assert!(both.validate(true).is_err());

        let mut neither = config();
        neither.store_url = None;
        assert!(neither.validate(true).is_err());
        assert!(neither.validate(false).is_ok());
    }
}
