//! Output export
//!
//! Identifiers are derived from the deployment target and application name
//! alone, so composing the same descriptor twice publishes the same values.

use ferry_core::domain::application::{ApplicationDescriptor, ApplicationOutputs};
use ferry_core::domain::release::url_label;
use ferry_core::domain::target::DeploymentTarget;
use uuid::Uuid;

/// Domain suffix every hosted application lives under
pub const HOSTING_DOMAIN: &str = "amplifyapp.com";

/// Length of the hex part of an application id
const APP_ID_HEX_LEN: usize = 13;

/// Stable application id: `d` followed by 13 hex characters
pub fn application_id(target: &DeploymentTarget, name: &str) -> String {
    let seed = format!(
        "{}/{}/{}/{}",
        target.partition, target.region, target.account, name
    );
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes());
    let hex = uuid.simple().to_string();
    format!("d{}", &hex[..APP_ID_HEX_LEN])
}

pub fn default_domain(app_id: &str) -> String {
    format!("{}.{}", app_id, HOSTING_DOMAIN)
}

/// Public URL of a branch: slashes in branch names become dashes
pub fn branch_url(branch: &str, domain: &str) -> String {
    format!("https://{}.{}", url_label(branch), domain)
}

/// Outputs for a named application and its branches
pub fn compute_outputs<'b>(
    target: &DeploymentTarget,
    name: &str,
    branches: impl IntoIterator<Item = &'b str>,
) -> ApplicationOutputs {
    let app_id = application_id(target, name);
    let default_domain = default_domain(&app_id);
    let branch_urls = branches
        .into_iter()
        .map(|branch| (branch.to_string(), branch_url(branch, &default_domain)))
        .collect();

    ApplicationOutputs {
        app_id,
        default_domain,
        branch_urls,
    }
}

pub fn export_outputs(descriptor: &ApplicationDescriptor) -> ApplicationOutputs {
    compute_outputs(
        &descriptor.target,
        &descriptor.name,
        descriptor.topology.branch_names(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> DeploymentTarget {
        DeploymentTarget::new("aws", "us-east-1", "123456789012")
    }

    #[test]
    fn test_application_id_shape() {
        let id = application_id(&target(), "AmplifyNextJsChatUI");
        assert_eq!(id.len(), 14);
        assert!(id.starts_with('d'));
        assert!(id[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_application_id_is_stable() {
        assert_eq!(
            application_id(&target(), "AmplifyNextJsChatUI"),
            application_id(&target(), "AmplifyNextJsChatUI")
        );
        assert_ne!(
            application_id(&target(), "AmplifyNextJsChatUI"),
            application_id(&target(), "OtherApp")
        );

        let other_region = DeploymentTarget::new("aws", "eu-west-1", "123456789012");
        assert_ne!(
            application_id(&target(), "AmplifyNextJsChatUI"),
            application_id(&other_region, "AmplifyNextJsChatUI")
        );
    }

    #[test]
    fn test_compute_outputs() {
        let outputs = compute_outputs(&target(), "ChatUI", ["main", "feature/x"]);
        assert_eq!(outputs.branch_urls.len(), 2);
        assert_eq!(
            outputs.branch_urls["feature/x"],
            format!("https://feature-x.{}", outputs.default_domain)
        );
    }

    #[test]
    fn test_branch_url() {
        assert_eq!(
            branch_url("feature/login", "d123.amplifyapp.com"),
            "https://feature-login.d123.amplifyapp.com"
        );
        assert_eq!(default_domain("d123"), "d123.amplifyapp.com");
    }
}
