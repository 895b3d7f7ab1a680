//! Identity binding
//!
//! Binds exactly one execution identity to the pipeline. A declared identity
//! gets the capabilities the descriptor actually needs (read access to each
//! namespace it resolves from, and to the source token) plus any explicit
//! grants, all checked against the allow-list.

use ferry_core::Result;
use ferry_core::domain::identity::{Capability, ExecutionIdentity, PolicyStatement};
use ferry_core::domain::manifest::{GrantSpec, IdentitySpec};
use ferry_core::domain::parameter::ParameterKey;
use ferry_core::domain::source::SecretRef;
use ferry_core::domain::target::DeploymentTarget;
use std::collections::BTreeSet;
use tracing::info;

use crate::policy::{PolicyAllowList, validate_role_arn};

/// Capabilities implied by the keys and token a descriptor consumes
///
/// One `ReadParameters` per distinct namespace, then one `ReadSecret` for the
/// source token.
pub fn required_capabilities<'k>(
    keys: impl IntoIterator<Item = &'k ParameterKey>,
    token: &SecretRef,
) -> Vec<Capability> {
    let namespaces: BTreeSet<&str> = keys.into_iter().map(|k| k.namespace()).collect();

    namespaces
        .into_iter()
        .map(|ns| Capability::ReadParameters {
            namespace: ns.to_string(),
        })
        .chain(std::iter::once(Capability::ReadSecret {
            name: token.name.clone(),
        }))
        .collect()
}

/// Bind the execution identity for a manifest
///
/// # Errors
/// - `PolicyViolation` if any statement falls outside the allow-list
/// - `InvalidDescriptor` if a referenced identity is not a role ARN
pub fn bind_identity(
    spec: &IdentitySpec,
    keys: &BTreeSet<ParameterKey>,
    token: &SecretRef,
    target: &DeploymentTarget,
) -> Result<ExecutionIdentity> {
    let identity = match spec {
        IdentitySpec::Declare {
            trusted_service,
            description,
            grants,
        } => {
            let allow_list = PolicyAllowList::new(target);

            let derived = required_capabilities(keys, token)
                .into_iter()
                .map(|cap| cap.to_statement(target));
            let declared = grants.iter().map(|grant| match grant {
                GrantSpec::Capability(cap) => cap.to_statement(target),
                GrantSpec::Statement(stmt) => stmt.clone(),
            });

            let mut statements = BTreeSet::new();
            for statement in derived.chain(declared) {
                allow_list.check(&statement)?;
                statements.insert(normalize(statement));
            }

            ExecutionIdentity::Declared {
                trusted_service: trusted_service.clone(),
                description: description.clone(),
                statements: statements.into_iter().collect(),
            }
        }
        IdentitySpec::Reference { arn } => {
            validate_role_arn(arn, target)?;
            ExecutionIdentity::Referenced { arn: arn.clone() }
        }
    };

    info!(
        "Bound {} identity with {} statement(s)",
        identity.strategy(),
        identity.statements().len()
    );
    Ok(identity)
}

/// Sort and de-duplicate actions and resources inside a statement
fn normalize(mut statement: PolicyStatement) -> PolicyStatement {
    statement.actions.sort();
    statement.actions.dedup();
    statement.resources.sort();
    statement.resources.dedup();
    statement
}
