//! End-to-end composition of Lua descriptor manifests

use ferry_composer::{Composer, render_buildspec, render_template};
use ferry_core::DescriptorError;
use ferry_core::domain::build::StaticLayoutProbe;
use ferry_core::domain::parameter::MemoryParameterStore;
use ferry_core::domain::release::Stage;
use ferry_core::domain::target::DeploymentTarget;
use ferry_lua::parse_descriptor;
use serde_json::Value;
use std::sync::Arc;

const CHAT_UI: &str = r#"
    return descriptor.define {
        name = "AmplifyNextJsChatUI",
        identity = { strategy = "declare", description = "Role for Amplify to use during builds" },
        source = {
            owner = "Masterpitan",
            repository = "llm-assistant-project",
            token = secret.ref("amplify/pat"),
        },
        build = {
            working_directories = { "frontend/chat-app", "chat-app" },
            install = "npm ci",
            build = "npm run build",
            artifacts = { base_directory = ".next", files = { "**/*" } },
            cache = { "node_modules/**/*" },
        },
        environment = {
            _CUSTOM_IMAGE = "amplify:al2023",
            POOL_ID = param.get("/ns/pool_id"),
            CLIENT_ID = param.get("/ns/client_id"),
            API_ENDPOINT = param.get("/ns/api"),
        },
        legacy_environment = {
            AMPLIFY_USERPOOL_ID = "POOL_ID",
            COGNITO_USERPOOL_CLIENT_ID = "CLIENT_ID",
        },
        branches = {
            { name = "main", stage = "PRODUCTION" },
            descriptor.branch("dev", "STAGING", { auto_delete = true }),
        },
    }
"#;

fn store() -> MemoryParameterStore {
    MemoryParameterStore::new()
        .with_value("/ns/pool_id", "p1")
        .with_value("/ns/client_id", "c1")
        .with_value("/ns/api", "https://api.example")
}

fn composer(store: MemoryParameterStore, dirs: &[&str]) -> Composer {
    Composer::new(
        Arc::new(store),
        Arc::new(StaticLayoutProbe::new(dirs.iter().copied())),
        DeploymentTarget::new("aws", "us-east-1", "123456789012"),
    )
}

#[tokio::test]
async fn chat_ui_composes_end_to_end() {
    let manifest = parse_descriptor(CHAT_UI).unwrap();
    let (descriptor, outputs) = composer(store(), &["frontend/chat-app"])
        .compose_with_outputs(&manifest)
        .await
        .unwrap();

    assert_eq!(descriptor.environment.get("POOL_ID"), Some("p1"));
    assert_eq!(descriptor.environment.get("CLIENT_ID"), Some("c1"));
    assert_eq!(descriptor.environment.get("API_ENDPOINT"), Some("https://api.example"));
    assert_eq!(descriptor.environment.get("AMPLIFY_USERPOOL_ID"), Some("p1"));
    assert_eq!(descriptor.environment.get("COGNITO_USERPOOL_CLIENT_ID"), Some("c1"));

    let main = descriptor.topology.environment("main").unwrap();
    let dev = descriptor.topology.environment("dev").unwrap();
    assert_eq!(main.branch.stage, Stage::Production);
    assert_eq!(dev.branch.stage, Stage::Staging);
    assert!(dev.branch.auto_delete);
    assert_eq!(main.build_spec, dev.build_spec);
    assert_eq!(main.environment, dev.environment);

    // One namespace read plus the token secret
    assert_eq!(descriptor.identity.statements().len(), 2);

    assert_eq!(outputs.default_domain, format!("{}.amplifyapp.com", outputs.app_id));
    assert_eq!(
        outputs.branch_urls["main"],
        format!("https://main.{}", outputs.default_domain)
    );
}

#[tokio::test]
async fn fallback_directory_is_recorded() {
    let manifest = parse_descriptor(CHAT_UI).unwrap();
    let descriptor = composer(store(), &["chat-app"])
        .compose(&manifest)
        .await
        .unwrap();

    let selection = &descriptor.build_spec.working_directory;
    assert_eq!(selection.selected, "chat-app");
    assert!(selection.used_fallback());

    let yaml = render_buildspec(&descriptor.build_spec).unwrap();
    assert!(yaml.contains("cd chat-app"));
    assert!(yaml.contains("chat-app/.next"));
}

#[tokio::test]
async fn missing_parameter_aborts_composition() {
    let manifest = parse_descriptor(CHAT_UI).unwrap();
    let store = MemoryParameterStore::new()
        .with_value("/ns/pool_id", "p1")
        .with_value("/ns/client_id", "c1");

    let err = composer(store, &["frontend/chat-app"])
        .compose(&manifest)
        .await
        .unwrap_err();

    assert!(matches!(err, DescriptorError::ConfigurationMissing(ref m) if m.contains("/ns/api")));
}

#[tokio::test]
async fn template_renders_identically_twice() {
    let manifest = parse_descriptor(CHAT_UI).unwrap();
    let composer = composer(store(), &["frontend/chat-app"]);

    let (first, first_outputs) = composer.compose_with_outputs(&manifest).await.unwrap();
    let (second, second_outputs) = composer.compose_with_outputs(&manifest).await.unwrap();

    let a = render_template(&first, &first_outputs).unwrap();
    let b = render_template(&second, &second_outputs).unwrap();
    assert_eq!(a, b);
    assert_eq!(first_outputs.app_id, second_outputs.app_id);
}

#[tokio::test]
async fn template_never_carries_secret_values() {
    let manifest = parse_descriptor(CHAT_UI).unwrap();
    let (descriptor, outputs) = composer(store(), &["frontend/chat-app"])
        .compose_with_outputs(&manifest)
        .await
        .unwrap();

    let rendered = render_template(&descriptor, &outputs).unwrap();
    let template: Value = serde_json::from_str(&rendered).unwrap();
    let resources = &template["Resources"];

    assert_eq!(resources["BuildRole"]["Type"], "AWS::IAM::Role");
    assert_eq!(resources["App"]["Type"], "AWS::Amplify::App");
    assert_eq!(
        resources["App"]["Properties"]["AccessToken"],
        "{{resolve:secretsmanager:amplify/pat:SecretString:::}}"
    );
    assert_eq!(resources["App"]["Properties"]["Platform"], "WEB_COMPUTE");
    assert_eq!(resources["App"]["Properties"]["EnableBranchAutoDeletion"], true);
    assert_eq!(resources["BranchMain"]["Properties"]["Stage"], "PRODUCTION");
    assert_eq!(resources["BranchDev"]["Properties"]["Stage"], "STAGING");
    assert_eq!(
        resources["BranchDev"]["Properties"]["Tags"][0]["Key"],
        "ferry:auto-delete"
    );
    assert!(resources["BranchMain"]["Properties"].get("Tags").is_none());

    let vars = resources["App"]["Properties"]["EnvironmentVariables"]
        .as_array()
        .unwrap();
    assert!(vars.iter().all(|v| !v["Value"].as_str().unwrap().contains("resolve:")));
    assert_eq!(template["Outputs"]["AppId"]["Value"], outputs.app_id.as_str());
}

#[tokio::test]
async fn wildcard_grant_is_rejected() {
    let source = CHAT_UI.replace(
        r#"identity = { strategy = "declare", description = "Role for Amplify to use during builds" },"#,
        r#"identity = {
            strategy = "declare",
            grants = { grant.statement { effect = "Allow", actions = { "*" }, resources = { "*" } } },
        },"#,
    );
    let manifest = parse_descriptor(&source).unwrap();

    let err = composer(store(), &["frontend/chat-app"])
        .compose(&manifest)
        .await
        .unwrap_err();
    assert!(matches!(err, DescriptorError::PolicyViolation(_)));
}

#[tokio::test]
async fn referenced_identity_renders_without_role() {
    let source = CHAT_UI.replace(
        r#"identity = { strategy = "declare", description = "Role for Amplify to use during builds" },"#,
        r#"identity = { strategy = "reference", arn = "arn:aws:iam::123456789012:role/amplify-build" },"#,
    );
    let manifest = parse_descriptor(&source).unwrap();
    let (descriptor, outputs) = composer(store(), &["frontend/chat-app"])
        .compose_with_outputs(&manifest)
        .await
        .unwrap();

    let template: Value =
        serde_json::from_str(&render_template(&descriptor, &outputs).unwrap()).unwrap();
    assert!(template["Resources"].get("BuildRole").is_none());
    assert_eq!(
        template["Resources"]["App"]["Properties"]["IAMServiceRole"],
        "arn:aws:iam::123456789012:role/amplify-build"
    );
}
