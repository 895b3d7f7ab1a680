//! Deployment target
//!
//! The account, region and partition a descriptor is composed for. Every
//! ARN produced by the identity binder is scoped to this target.

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// Where the descriptor will be deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    /// ARN partition (e.g., "aws", "aws-cn")
    pub partition: String,
    /// Region (e.g., "us-east-1")
    pub region: String,
    /// Twelve-digit account id
    pub account: String,
}

impl DeploymentTarget {
    pub fn new(
        partition: impl Into<String>,
        region: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            region: region.into(),
            account: account.into(),
        }
    }

    /// Validates the target coordinates
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.partition.is_empty() {
            return Err(DescriptorError::ConfigurationMissing(
                "deployment partition".to_string(),
            ));
        }

        if self.region.is_empty() {
            return Err(DescriptorError::ConfigurationMissing(
                "deployment region".to_string(),
            ));
        }

        if !self
            .region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DescriptorError::invalid(format!(
                "Region '{}' is not a valid region name",
                self.region
            )));
        }

        if !is_account_id(&self.account) {
            return Err(DescriptorError::invalid(format!(
                "Account '{}' must be a 12-digit account id",
                self.account
            )));
        }

        Ok(())
    }
}

/// Check that a string is a twelve-digit account id
pub fn is_account_id(value: &str) -> bool {
    value.len() == 12 && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_target() {
        let target = DeploymentTarget::new("aws", "us-east-1", "123456789012");
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_target_validation() {
        let mut target = DeploymentTarget::new("aws", "us-east-1", "123456789012");

        target.account = "1234".to_string();
        assert!(target.validate().is_err());

        target.account = "123456789012".to_string();
        target.region = String::new();
        assert!(matches!(
            target.validate(),
            Err(DescriptorError::ConfigurationMissing(_))
        ));

        target.region = "US_EAST".to_string();
        assert!(target.validate().is_err());
    }
}
