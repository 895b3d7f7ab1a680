//! Permission allow-list
//!
//! Every statement attached to a declared build identity is checked here
//! before it is bound. Only read access to parameters and secrets in the
//! deployment target is permitted, and wildcards must be anchored to a
//! namespace or secret name.

use ferry_core::domain::identity::PolicyStatement;
use ferry_core::domain::target::{DeploymentTarget, is_account_id};
use ferry_core::{DescriptorError, Result};

/// Actions a build identity may be granted
pub const ALLOWED_ACTIONS: &[&str] = &[
    "ssm:GetParameter",
    "ssm:GetParameters",
    "ssm:GetParametersByPath",
    "secretsmanager:GetSecretValue",
];

/// Allow-list bound to one deployment target
#[derive(Debug, Clone)]
pub struct PolicyAllowList<'a> {
    target: &'a DeploymentTarget,
}

impl<'a> PolicyAllowList<'a> {
    pub fn new(target: &'a DeploymentTarget) -> Self {
        Self { target }
    }

    /// Check a statement against the allow-list
    ///
    /// # Errors
    /// Returns `PolicyViolation` naming the first offending action or
    /// resource.
    pub fn check(&self, statement: &PolicyStatement) -> Result<()> {
        if statement.actions.is_empty() {
            return Err(DescriptorError::policy("statement has no actions"));
        }
        if statement.resources.is_empty() {
            return Err(DescriptorError::policy("statement has no resources"));
        }

        for action in &statement.actions {
            if !ALLOWED_ACTIONS.contains(&action.as_str()) {
                return Err(DescriptorError::policy(format!(
                    "action '{}' is not in the allow-list",
                    action
                )));
            }
        }

        for resource in &statement.resources {
            let service = self.check_resource(resource)?;
            for action in &statement.actions {
                if action_service(action) != service {
                    return Err(DescriptorError::policy(format!(
                        "action '{}' does not apply to resource '{}'",
                        action, resource
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate a resource ARN and return its service
    fn check_resource<'r>(&self, resource: &'r str) -> Result<&'r str> {
        let violation =
            |reason: &str| DescriptorError::policy(format!("resource '{}' {}", resource, reason));

        // IAM treats '?' as a single-character wildcard in any field
        if resource.contains('?') {
            return Err(violation("may not use the '?' wildcard"));
        }

        // arn:partition:service:region:account:resource
        let parts: Vec<&str> = resource.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(violation("is not an ARN"));
        }

        let (partition, service, region, account, path) =
            (parts[1], parts[2], parts[3], parts[4], parts[5]);

        if partition != self.target.partition {
            return Err(violation("is outside the deployment partition"));
        }
        if region != self.target.region {
            return Err(violation("is outside the deployment region"));
        }
        if account != self.target.account {
            return Err(violation("is outside the deployment account"));
        }

        let name = match service {
            "ssm" => path.strip_prefix("parameter/"),
            "secretsmanager" => path.strip_prefix("secret:"),
            _ => None,
        }
        .ok_or_else(|| violation("does not name a parameter or secret"))?;

        check_wildcard(service, name).map_err(|reason| violation(reason))?;

        Ok(service)
    }
}

fn action_service(action: &str) -> &str {
    action.split(':').next().unwrap_or(action)
}

/// Wildcards are only allowed as the last character after a real prefix
fn check_wildcard(service: &str, name: &str) -> std::result::Result<(), &'static str> {
    let Some(pos) = name.find('*') else {
        return if name.is_empty() {
            Err("has an empty name")
        } else {
            Ok(())
        };
    };

    if pos != name.len() - 1 {
        return Err("may only use '*' as the final character");
    }

    let prefix = &name[..pos];
    let anchored = match service {
        // parameter/<ns>/*
        "ssm" => prefix.len() > 1 && prefix.ends_with('/') && !prefix.starts_with('/'),
        // secret:<name>*
        _ => !prefix.is_empty(),
    };

    if anchored {
        Ok(())
    } else {
        Err("uses a wildcard without a namespace prefix")
    }
}

/// Validate a referenced role ARN: `arn:{partition}:iam::{account}:role/{name}`
pub fn validate_role_arn(arn: &str, target: &DeploymentTarget) -> Result<()> {
    let invalid = || {
        DescriptorError::invalid(format!(
            "Identity '{}' is not a role ARN of the form arn:{}:iam::<account>:role/<name>",
            arn, target.partition
        ))
    };

    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" || parts[2] != "iam" || !parts[3].is_empty() {
        return Err(invalid());
    }
    if parts[1] != target.partition || !is_account_id(parts[4]) {
        return Err(invalid());
    }

    match parts[5].strip_prefix("role/") {
        Some(name) if !name.is_empty() && !name.contains('*') => Ok(()),
        _ => Err(invalid()),
    }
}
