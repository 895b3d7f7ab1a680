//! Descriptor manifest parser
//!
//! Evaluates a Lua manifest in the sandbox and converts the returned table
//! into a `DescriptorManifest`. Nothing is resolved here: parameter keys and
//! secret names stay references.

use anyhow::{Context, Result, anyhow, bail};
use ferry_core::domain::application::Platform;
use ferry_core::domain::build::ArtifactLocation;
use ferry_core::domain::environment::EnvValue;
use ferry_core::domain::identity::{Capability, DEFAULT_TRUSTED_SERVICE, Effect, PolicyStatement};
use ferry_core::domain::manifest::{
    BuildManifest, DescriptorManifest, GrantSpec, IdentitySpec, SourceSpec,
};
use ferry_core::domain::parameter::ParameterKey;
use ferry_core::domain::release::{ReleaseBranch, Stage};
use ferry_core::domain::source::SecretRef;
use mlua::{Table, Value};
use std::collections::BTreeMap;

use crate::modules::{GRANT_MARKER, MARKER_FIELD, PARAMETER_MARKER, SECRET_MARKER};
use crate::sandbox::create_sandbox;

/// Parse a descriptor manifest from Lua source code
///
/// # Errors
/// Returns an error if:
/// - The Lua source is invalid or does not return a table
/// - Required fields are missing (name, identity, source, build, branches)
/// - Field types are incorrect
/// - A secret reference appears where only plain values are allowed, or a
///   literal string appears where a secret reference is required
/// - The result fails structural validation
///
/// # Example
/// ```no_run
/// use ferry_lua::parser::parse_descriptor;
///
/// let source = r#"
///     return descriptor.define {
///         name = "ChatUI",
///         identity = { strategy = "declare" },
///         source = { owner = "octo", repository = "chat", token = secret.ref("amplify/pat") },
///         build = {
///             working_directories = { "frontend/chat-app", "chat-app" },
///             install = "npm ci",
///             build = "npm run build",
///             artifacts = { base_directory = ".next" },
///         },
///         environment = { POOL_ID = param.get("/ns/pool_id") },
///         branches = { { name = "main", stage = "PRODUCTION" } },
///     }
/// "#;
///
/// let manifest = parse_descriptor(source)?;
/// assert_eq!(manifest.name, "ChatUI");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parse_descriptor(source: &str) -> Result<DescriptorManifest> {
    let lua = create_sandbox().context("Failed to create manifest sandbox")?;

    let descriptor: Table = lua
        .load(source)
        .set_name("descriptor")
        .eval()
        .context("Failed to evaluate descriptor manifest")?;

    let name: String = descriptor
        .get("name")
        .context("Descriptor must have a 'name' field")?;

    let description: Option<String> = descriptor
        .get("description")
        .context("Field 'description' must be a string")?;

    let platform = match descriptor
        .get::<Option<String>>("platform")
        .context("Field 'platform' must be a string")?
    {
        Some(raw) => raw.parse::<Platform>().map_err(|e| anyhow!(e))?,
        None => Platform::default(),
    };

    let identity = parse_identity(&descriptor)?;
    let source = parse_source(&descriptor)?;
    let build = parse_build(&descriptor)?;
    let environment = parse_environment(&descriptor)?;
    let legacy_environment = parse_legacy_environment(&descriptor)?;

    let auto_branch_deletion = descriptor
        .get::<Option<bool>>("auto_branch_deletion")
        .context("Field 'auto_branch_deletion' must be a boolean")?
        .unwrap_or(true);

    let branches = parse_branches(&descriptor)?;

    let manifest = DescriptorManifest {
        name,
        description,
        platform,
        identity,
        source,
        build,
        environment,
        legacy_environment,
        auto_branch_deletion,
        branches,
    };

    manifest.validate()?;

    Ok(manifest)
}

/// Parse the 'identity' field
fn parse_identity(descriptor: &Table) -> Result<IdentitySpec> {
    let identity: Table = descriptor
        .get("identity")
        .context("Descriptor must have an 'identity' table")?;

    let strategy = identity
        .get::<Option<String>>("strategy")
        .context("Identity 'strategy' must be a string")?
        .unwrap_or_else(|| "declare".to_string());

    match strategy.as_str() {
        "declare" => {
            let trusted_service = identity
                .get::<Option<String>>("trusted_service")
                .context("Identity 'trusted_service' must be a string")?
                .unwrap_or_else(|| DEFAULT_TRUSTED_SERVICE.to_string());

            let description: Option<String> = identity
                .get("description")
                .context("Identity 'description' must be a string")?;

            let grants = match identity.get::<Value>("grants")? {
                Value::Nil => Vec::new(),
                Value::Table(table) => {
                    let mut grants = Vec::new();
                    for entry in table.sequence_values::<Table>() {
                        let entry = entry.context("Each grant must be created with grant.*")?;
                        grants.push(parse_grant(&entry)?);
                    }
                    grants
                }
                _ => bail!("Identity 'grants' must be an array of grants"),
            };

            Ok(IdentitySpec::Declare {
                trusted_service,
                description,
                grants,
            })
        }
        "reference" => {
            let arn: String = identity
                .get("arn")
                .context("Identity with strategy 'reference' must have an 'arn' field")?;
            Ok(IdentitySpec::Reference { arn })
        }
        other => bail!(
            "Unknown identity strategy '{}' (expected 'declare' or 'reference')",
            other
        ),
    }
}

/// Parse a single grant marker
fn parse_grant(entry: &Table) -> Result<GrantSpec> {
    if marker_kind(entry)?.as_deref() != Some(GRANT_MARKER) {
        bail!("Grants must be created with grant.read_parameters, grant.read_secret or grant.statement");
    }

    let capability: String = entry.get("capability").context("Grant is missing its capability")?;

    match capability.as_str() {
        "read_parameters" => {
            let namespace: String = entry.get("namespace")?;
            Ok(GrantSpec::Capability(Capability::ReadParameters { namespace }))
        }
        "read_secret" => {
            let name: String = entry.get("name")?;
            Ok(GrantSpec::Capability(Capability::ReadSecret { name }))
        }
        "statement" => {
            let effect = match entry.get::<Option<String>>("effect")? {
                Some(raw) => raw.parse::<Effect>().map_err(|e| anyhow!(e))?,
                None => Effect::Allow,
            };
            let actions = string_list(entry, "actions")?
                .ok_or_else(|| anyhow!("Statement grant must have 'actions'"))?;
            let resources = string_list(entry, "resources")?
                .ok_or_else(|| anyhow!("Statement grant must have 'resources'"))?;

            Ok(GrantSpec::Statement(PolicyStatement {
                effect,
                actions,
                resources,
            }))
        }
        other => bail!("Unknown grant capability '{}'", other),
    }
}

/// Parse the 'source' field
fn parse_source(descriptor: &Table) -> Result<SourceSpec> {
    let source: Table = descriptor
        .get("source")
        .context("Descriptor must have a 'source' table")?;

    let owner: String = source.get("owner").context("Source must have an 'owner' field")?;
    let repository: String = source
        .get("repository")
        .context("Source must have a 'repository' field")?;

    let token = match source.get::<Value>("token")? {
        Value::Table(marker) if marker_kind(&marker)?.as_deref() == Some(SECRET_MARKER) => {
            SecretRef::new(marker.get::<String>("name")?)
        }
        Value::Nil => bail!("Source must have a 'token' field created with secret.ref(name)"),
        _ => bail!("Source 'token' must be a secret reference: use secret.ref(name), never a literal value"),
    };

    Ok(SourceSpec {
        owner,
        repository,
        token,
    })
}

/// Parse the 'build' field
fn parse_build(descriptor: &Table) -> Result<BuildManifest> {
    let build: Table = descriptor
        .get("build")
        .context("Descriptor must have a 'build' table")?;

    let working_directories =
        string_list(&build, "working_directories")?.unwrap_or_else(|| vec![".".to_string()]);

    let install =
        string_list(&build, "install")?.ok_or_else(|| anyhow!("Build must have an 'install' command"))?;

    let build_commands =
        string_list(&build, "build")?.ok_or_else(|| anyhow!("Build must have a 'build' command"))?;

    let artifacts_table: Table = build
        .get("artifacts")
        .context("Build must have an 'artifacts' table")?;

    let base_directory: String = artifacts_table
        .get("base_directory")
        .context("Artifacts must have a 'base_directory' field")?;

    let files = string_list(&artifacts_table, "files")?.unwrap_or_else(|| vec!["**/*".to_string()]);

    let cache = string_list(&build, "cache")?.unwrap_or_default();

    Ok(BuildManifest {
        working_directories,
        install,
        build: build_commands,
        artifacts: ArtifactLocation {
            base_directory,
            files,
        },
        cache,
    })
}

/// Parse the 'environment' field
fn parse_environment(descriptor: &Table) -> Result<BTreeMap<String, EnvValue>> {
    let environment_value: Value = descriptor.get("environment").unwrap_or(Value::Nil);

    match environment_value {
        Value::Nil => Ok(BTreeMap::new()),
        Value::Table(table) => {
            let mut environment = BTreeMap::new();

            for pair in table.pairs::<String, Value>() {
                let (name, value) = pair.context("Environment keys must be strings")?;

                let value = match value {
                    Value::String(s) => EnvValue::Literal(s.to_str()?.to_string()),
                    Value::Integer(i) => EnvValue::Literal(i.to_string()),
                    Value::Number(n) => EnvValue::Literal(n.to_string()),
                    Value::Boolean(b) => EnvValue::Literal(b.to_string()),
                    Value::Table(marker) => match marker_kind(&marker)?.as_deref() {
                        Some(PARAMETER_MARKER) => {
                            let key: String = marker.get("key")?;
                            EnvValue::Parameter(ParameterKey::parse(&key)?)
                        }
                        Some(SECRET_MARKER) => bail!(
                            "Environment variable '{}' cannot hold a secret reference; \
                             secrets are only passed through the source token",
                            name
                        ),
                        _ => bail!(
                            "Environment variable '{}' must be a string, number, boolean or param.get(...)",
                            name
                        ),
                    },
                    _ => bail!("Environment variable '{}' has an unsupported value type", name),
                };

                environment.insert(name, value);
            }

            Ok(environment)
        }
        _ => Err(anyhow!("Field 'environment' must be a table")),
    }
}

/// Parse the 'legacy_environment' field
fn parse_legacy_environment(descriptor: &Table) -> Result<BTreeMap<String, String>> {
    match descriptor.get::<Value>("legacy_environment")? {
        Value::Nil => Ok(BTreeMap::new()),
        Value::Table(table) => {
            let mut aliases = BTreeMap::new();
            for pair in table.pairs::<String, String>() {
                let (legacy, canonical) =
                    pair.context("Field 'legacy_environment' must map names to names")?;
                aliases.insert(legacy, canonical);
            }
            Ok(aliases)
        }
        _ => Err(anyhow!("Field 'legacy_environment' must be a table")),
    }
}

/// Parse the 'branches' field
fn parse_branches(descriptor: &Table) -> Result<Vec<ReleaseBranch>> {
    let branches_table: Table = descriptor
        .get("branches")
        .context("Descriptor must have a 'branches' field")?;

    let mut branches = Vec::new();

    for entry in branches_table.sequence_values::<Table>() {
        let branch = entry.context("Failed to read branch entry")?;

        let name: String = branch.get("name").context("Branch must have a 'name' field")?;

        let stage: String = branch
            .get("stage")
            .with_context(|| format!("Branch '{}' must have a 'stage' field", name))?;
        let stage = stage
            .parse::<Stage>()
            .map_err(|e| anyhow!("Branch '{}': {}", name, e))?;

        let auto_build = branch.get::<Option<bool>>("auto_build")?.unwrap_or(true);
        let auto_delete = branch.get::<Option<bool>>("auto_delete")?.unwrap_or(false);

        branches.push(
            ReleaseBranch::new(name, stage)
                .with_auto_build(auto_build)
                .with_auto_delete(auto_delete),
        );
    }

    if branches.is_empty() {
        return Err(anyhow!("Descriptor must declare at least one branch"));
    }

    Ok(branches)
}

/// Read a field holding either a single string or an array of strings
fn string_list(table: &Table, field: &str) -> Result<Option<Vec<String>>> {
    match table.get::<Value>(field)? {
        Value::Nil => Ok(None),
        Value::String(s) => Ok(Some(vec![s.to_str()?.to_string()])),
        Value::Table(items) => {
            let mut values = Vec::new();
            for item in items.sequence_values::<String>() {
                values.push(
                    item.with_context(|| format!("Field '{}' must contain only strings", field))?,
                );
            }
            Ok(Some(values))
        }
        _ => Err(anyhow!(
            "Field '{}' must be a string or an array of strings",
            field
        )),
    }
}

/// Marker kind of a helper-produced table, if any
fn marker_kind(table: &Table) -> Result<Option<String>> {
    Ok(table.get::<Option<String>>(MARKER_FIELD)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        return descriptor.define {
            name = "AmplifyNextJsChatUI",
            description = "Chat UI",
            identity = {
                strategy = "declare",
                description = "Role for builds",
                grants = { grant.read_parameters("/Shared") },
            },
            source = {
                owner = "Masterpitan",
                repository = "llm-assistant-project",
                token = secret.ref("amplify/pat"),
            },
            build = {
                working_directories = { "frontend/chat-app", "chat-app" },
                install = "npm ci",
                build = { "npm run lint", "npm run build" },
                artifacts = { base_directory = ".next" },
                cache = { "node_modules/**/*" },
            },
            environment = {
                _CUSTOM_IMAGE = "amplify:al2023",
                POOL_ID = param.get("/AgenticLLMAssistantWorkshop/cognito_user_pool_id"),
                API_ENDPOINT = param.get("/AgenticLLMAssistantWorkshop/agent_api"),
                RETRIES = 3,
            },
            legacy_environment = { AMPLIFY_USERPOOL_ID = "POOL_ID" },
            branches = {
                { name = "main", stage = "PRODUCTION" },
                descriptor.branch("dev", "STAGING", { auto_delete = true }),
            },
        }
    "#;

    #[test]
    fn test_parse_full_descriptor() {
        let manifest = parse_descriptor(FULL).unwrap();

        assert_eq!(manifest.name, "AmplifyNextJsChatUI");
        assert_eq!(manifest.description, Some("Chat UI".to_string()));
        assert_eq!(manifest.platform, Platform::WebCompute);
        assert!(manifest.auto_branch_deletion);

        match &manifest.identity {
            IdentitySpec::Declare {
                trusted_service,
                grants,
                ..
            } => {
                assert_eq!(trusted_service, DEFAULT_TRUSTED_SERVICE);
                assert_eq!(
                    grants,
                    &vec![GrantSpec::Capability(Capability::ReadParameters {
                        namespace: "Shared".to_string()
                    })]
                );
            }
            other => panic!("unexpected identity {:?}", other),
        }

        assert_eq!(manifest.source.token, SecretRef::new("amplify/pat"));
        assert_eq!(
            manifest.build.working_directories,
            vec!["frontend/chat-app", "chat-app"]
        );
        assert_eq!(manifest.build.install, vec!["npm ci"]);
        assert_eq!(manifest.build.build, vec!["npm run lint", "npm run build"]);
        assert_eq!(manifest.build.artifacts.files, vec!["**/*"]);

        assert_eq!(
            manifest.environment["_CUSTOM_IMAGE"],
            EnvValue::Literal("amplify:al2023".to_string())
        );
        assert_eq!(
            manifest.environment["RETRIES"],
            EnvValue::Literal("3".to_string())
        );
        assert!(matches!(
            manifest.environment["POOL_ID"],
            EnvValue::Parameter(_)
        ));
        assert_eq!(manifest.parameter_keys().len(), 2);
        assert_eq!(manifest.legacy_environment["AMPLIFY_USERPOOL_ID"], "POOL_ID");

        assert_eq!(manifest.branches.len(), 2);
        assert_eq!(manifest.branches[0].stage, Stage::Production);
        assert!(!manifest.branches[0].auto_delete);
        assert_eq!(manifest.branches[1].stage, Stage::Staging);
        assert!(manifest.branches[1].auto_delete);
        assert!(manifest.branches[1].auto_build);
    }

    #[test]
    fn test_parse_reference_identity() {
        let source = FULL.replace(
            r#"identity = {
                strategy = "declare",
                description = "Role for builds",
                grants = { grant.read_parameters("/Shared") },
            },"#,
            r#"identity = { strategy = "reference", arn = "arn:aws:iam::123456789012:role/build" },"#,
        );

        let manifest = parse_descriptor(&source).unwrap();
        assert_eq!(
            manifest.identity,
            IdentitySpec::Reference {
                arn: "arn:aws:iam::123456789012:role/build".to_string()
            }
        );
    }

    #[test]
    fn test_literal_token_rejected() {
        let source = FULL.replace(r#"secret.ref("amplify/pat")"#, r#""ghp_abcdef""#);

        let err = parse_descriptor(&source).unwrap_err();
        assert!(err.to_string().contains("secret reference"));
    }

    #[test]
    fn test_secret_in_environment_rejected() {
        let source = FULL.replace(
            r#"RETRIES = 3,"#,
            r#"GITHUB_TOKEN = secret.ref("amplify/pat"),"#,
        );

        let err = parse_descriptor(&source).unwrap_err();
        assert!(err.to_string().contains("cannot hold a secret reference"));
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let source = FULL.replace(r#"stage = "PRODUCTION""#, r#"stage = "LIVE""#);

        let err = parse_descriptor(&source).unwrap_err();
        assert!(err.to_string().contains("unknown stage"));
    }

    #[test]
    fn test_duplicate_branch_rejected() {
        let source = FULL.replace(r#"descriptor.branch("dev""#, r#"descriptor.branch("main""#);

        let err = parse_descriptor(&source).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_missing_name() {
        let source = FULL.replace(r#"name = "AmplifyNextJsChatUI","#, "");

        let err = parse_descriptor(&source).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_default_working_directory() {
        let source = FULL.replace(
            r#"working_directories = { "frontend/chat-app", "chat-app" },"#,
            "",
        );

        let manifest = parse_descriptor(&source).unwrap();
        assert_eq!(manifest.build.working_directories, vec!["."]);
    }

    #[test]
    fn test_plain_table_grant_rejected() {
        let source = FULL.replace(
            r#"grants = { grant.read_parameters("/Shared") },"#,
            r#"grants = { { capability = "read_parameters", namespace = "x" } },"#,
        );

        assert!(parse_descriptor(&source).is_err());
    }

    #[test]
    fn test_invalid_lua() {
        assert!(parse_descriptor("this is not valid lua!!!").is_err());
    }

    #[test]
    fn test_not_returning_table() {
        assert!(parse_descriptor(r#"return "not a table""#).is_err());
    }
}
