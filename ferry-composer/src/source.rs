//! Source binding
//!
//! Associates the pipeline with its repository. The token stays a secret
//! reference; reachability is the build platform's concern.

use ferry_core::domain::manifest::SourceSpec;
use ferry_core::domain::source::SourceBinding;
use tracing::info;

pub fn bind_source(spec: &SourceSpec) -> SourceBinding {
    let binding = SourceBinding {
        owner: spec.owner.trim().to_string(),
        repository: spec.repository.trim().to_string(),
        token: spec.token.clone(),
    };

    info!(
        "Bound source {} (token from {})",
        binding.slug(),
        binding.token
    );
    binding
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::domain::source::SecretRef;

    #[test]
    fn test_bind_source_keeps_reference() {
        let spec = SourceSpec {
            owner: "Masterpitan".to_string(),
            repository: " llm-assistant-project ".to_string(),
            token: SecretRef::new("amplify/pat"),
        };

        let binding = bind_source(&spec);
        assert_eq!(binding.slug(), "Masterpitan/llm-assistant-project");
        assert_eq!(binding.token.name, "amplify/pat");
    }
}
