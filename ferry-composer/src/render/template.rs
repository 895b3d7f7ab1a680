//! Deployment template document
//!
//! JSON maps are sorted, so the template is byte-identical for identical
//! descriptors.

use ferry_core::domain::application::{ApplicationDescriptor, ApplicationOutputs};
use ferry_core::domain::environment::EnvironmentMap;
use ferry_core::domain::identity::{ExecutionIdentity, PolicyStatement};
use ferry_core::domain::release::{ReleaseEnvironment, pascal_label};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

use super::{RenderError, render_buildspec};

const TEMPLATE_VERSION: &str = "2010-09-09";
const POLICY_VERSION: &str = "2012-10-17";
const ROLE_LOGICAL_ID: &str = "BuildRole";
const APP_LOGICAL_ID: &str = "App";
/// Tag marking branches whose environment is removed with the branch
pub const AUTO_DELETE_TAG: &str = "ferry:auto-delete";

/// Template resource name of a branch: `Branch` + alphanumeric PascalCase
///
/// `feature/login-page` becomes `BranchFeatureLoginPage`.
pub fn branch_logical_id(branch: &str) -> String {
    format!("Branch{}", pascal_label(branch))
}

/// Render the deployment template as pretty-printed JSON
///
/// # Errors
/// Fails if two branches map to the same resource name or if the build
/// spec cannot be rendered.
pub fn render_template(
    descriptor: &ApplicationDescriptor,
    outputs: &ApplicationOutputs,
) -> Result<String, RenderError> {
    let mut resources = Map::new();

    if let ExecutionIdentity::Declared {
        trusted_service,
        description,
        statements,
    } = &descriptor.identity
    {
        resources.insert(
            ROLE_LOGICAL_ID.to_string(),
            role_resource(&descriptor.name, trusted_service, description.as_deref(), statements),
        );
    }

    resources.insert(APP_LOGICAL_ID.to_string(), app_resource(descriptor)?);

    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for env in &descriptor.topology.environments {
        let logical_id = branch_logical_id(&env.branch.name);
        if let Some(first) = seen.insert(logical_id.clone(), &env.branch.name) {
            return Err(RenderError::LogicalIdCollision {
                first: first.to_string(),
                second: env.branch.name.clone(),
                logical_id,
            });
        }
        resources.insert(logical_id, branch_resource(env, descriptor)?);
    }

    let mut template = json!({
        "AWSTemplateFormatVersion": TEMPLATE_VERSION,
        "Resources": resources,
        "Outputs": outputs_section(descriptor, outputs),
    });
    if let Some(description) = &descriptor.description {
        template["Description"] = json!(description);
    }

    let mut rendered = serde_json::to_string_pretty(&template)?;
    rendered.push('\n');
    Ok(rendered)
}

fn role_resource(
    app_name: &str,
    trusted_service: &str,
    description: Option<&str>,
    statements: &[PolicyStatement],
) -> Value {
    let policy_statements: Vec<Value> = statements
        .iter()
        .map(|s| {
            json!({
                "Effect": s.effect.to_string(),
                "Action": s.actions,
                "Resource": s.resources,
            })
        })
        .collect();

    let mut properties = json!({
        "AssumeRolePolicyDocument": {
            "Version": POLICY_VERSION,
            "Statement": [{
                "Effect": "Allow",
                "Principal": { "Service": trusted_service },
                "Action": "sts:AssumeRole",
            }],
        },
    });

    if let Some(description) = description {
        properties["Description"] = json!(description);
    }
    if !policy_statements.is_empty() {
        properties["Policies"] = json!([{
            "PolicyName": format!("{}-build-access", app_name),
            "PolicyDocument": {
                "Version": POLICY_VERSION,
                "Statement": policy_statements,
            },
        }]);
    }

    json!({ "Type": "AWS::IAM::Role", "Properties": properties })
}

fn app_resource(descriptor: &ApplicationDescriptor) -> Result<Value, RenderError> {
    let role = match &descriptor.identity {
        ExecutionIdentity::Declared { .. } => json!({ "Fn::GetAtt": [ROLE_LOGICAL_ID, "Arn"] }),
        ExecutionIdentity::Referenced { arn } => json!(arn),
    };

    let mut properties = json!({
        "Name": descriptor.name,
        "Repository": descriptor.source.repository_url(),
        "AccessToken": descriptor.source.token.dynamic_reference(),
        "BuildSpec": render_buildspec(&descriptor.build_spec)?,
        "Platform": descriptor.platform.as_str(),
        "EnableBranchAutoDeletion": descriptor.topology.auto_branch_deletion,
        "EnvironmentVariables": environment_variables(&descriptor.environment, None),
        "IAMServiceRole": role,
    });
    if let Some(description) = &descriptor.description {
        properties["Description"] = json!(description);
    }

    Ok(json!({ "Type": "AWS::Amplify::App", "Properties": properties }))
}

fn branch_resource(
    env: &ReleaseEnvironment,
    descriptor: &ApplicationDescriptor,
) -> Result<Value, RenderError> {
    let mut properties = json!({
        "AppId": { "Fn::GetAtt": [APP_LOGICAL_ID, "AppId"] },
        "BranchName": env.branch.name,
        "Stage": env.branch.stage.as_str(),
        "EnableAutoBuild": env.branch.auto_build,
    });

    // Only what differs from the application defaults is set per branch
    let overrides = environment_variables(&env.environment, Some(&descriptor.environment));
    if overrides.as_array().is_some_and(|vars| !vars.is_empty()) {
        properties["EnvironmentVariables"] = overrides;
    }
    if env.build_spec != descriptor.build_spec {
        properties["BuildSpec"] = json!(render_buildspec(&env.build_spec)?);
    }
    if env.branch.auto_delete {
        properties["Tags"] = json!([{ "Key": AUTO_DELETE_TAG, "Value": "true" }]);
    }

    Ok(json!({
        "Type": "AWS::Amplify::Branch",
        "DependsOn": APP_LOGICAL_ID,
        "Properties": properties,
    }))
}

/// Name/value pairs in name order, skipping entries equal to `base`
fn environment_variables(env: &EnvironmentMap, base: Option<&EnvironmentMap>) -> Value {
    let vars: Vec<Value> = env
        .iter()
        .filter(|(name, entry)| base.and_then(|b| b.get(name)) != Some(entry.value.as_str()))
        .map(|(name, entry)| json!({ "Name": name, "Value": entry.value }))
        .collect();
    Value::Array(vars)
}

fn outputs_section(descriptor: &ApplicationDescriptor, outputs: &ApplicationOutputs) -> Value {
    let mut section = json!({
        "AppId": { "Value": outputs.app_id },
        "DefaultDomain": { "Value": outputs.default_domain },
    });

    let primary = descriptor
        .topology
        .environments
        .first()
        .and_then(|env| outputs.branch_urls.get(&env.branch.name));
    if let Some(url) = primary {
        section["AppUrl"] = json!({ "Value": url });
    }

    section
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_logical_id() {
        assert_eq!(branch_logical_id("main"), "BranchMain");
        assert_eq!(branch_logical_id("dev"), "BranchDev");
        assert_eq!(branch_logical_id("feature/login-page"), "BranchFeatureLoginPage");
    }
}
