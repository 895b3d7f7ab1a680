//! Parameter resolution
//!
//! Reads every parameter key a manifest references from the shared store.
//! Keys are read one at a time in key order; the first failure aborts the
//! whole pass.

use ferry_core::Result;
use ferry_core::domain::parameter::{ConfigValue, ParameterKey, ParameterStore};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Resolves parameter keys against a store
pub struct ParameterResolver<'a> {
    store: &'a dyn ParameterStore,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(store: &'a dyn ParameterStore) -> Self {
        Self { store }
    }

    /// Resolve a single key
    ///
    /// # Errors
    /// - `ConfigurationMissing` if the key does not exist
    /// - `PermissionDenied` if the resolving identity cannot read it
    /// - `StoreUnavailable` if the store could not be reached
    pub async fn resolve(&self, key: &ParameterKey) -> Result<ConfigValue> {
        debug!("Resolving parameter {}", key);
        let value = self.store.get_parameter(key).await?;
        Ok(value)
    }

    /// Resolve every key, returning values indexed by key
    pub async fn resolve_all(
        &self,
        keys: &BTreeSet<ParameterKey>,
    ) -> Result<BTreeMap<String, ConfigValue>> {
        let mut resolved = BTreeMap::new();

        for key in keys {
            let value = self.resolve(key).await?;
            resolved.insert(key.as_str().to_string(), value);
        }

        info!("Resolved {} parameter(s)", resolved.len());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::DescriptorError;
    use ferry_core::domain::parameter::MemoryParameterStore;

    fn keys(raw: &[&str]) -> BTreeSet<ParameterKey> {
        raw.iter().map(|k| ParameterKey::parse(k).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_resolve_all() {
        let store = MemoryParameterStore::new()
            .with_value("/ns/pool_id", "p1")
            .with_value("/ns/client_id", "c1");
        let resolver = ParameterResolver::new(&store);

        let resolved = resolver
            .resolve_all(&keys(&["/ns/pool_id", "/ns/client_id"]))
            .await
            .unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["/ns/pool_id"].value, "p1");
        assert_eq!(resolved["/ns/client_id"].value, "c1");
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_missing() {
        let store = MemoryParameterStore::new().with_value("/ns/pool_id", "p1");
        let resolver = ParameterResolver::new(&store);

        let err = resolver
            .resolve_all(&keys(&["/ns/pool_id", "/ns/api"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DescriptorError::ConfigurationMissing(ref m) if m.contains("/ns/api")));
    }

    #[tokio::test]
    async fn test_denied_key_is_permission_denied() {
        let store = MemoryParameterStore::new()
            .with_value("/other/secret_thing", "x")
            .with_readable_prefix("/ns/");
        let resolver = ParameterResolver::new(&store);

        let err = resolver
            .resolve_all(&keys(&["/other/secret_thing"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DescriptorError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_no_keys_resolves_nothing() {
        let store = MemoryParameterStore::new();
        let resolved = ParameterResolver::new(&store)
            .resolve_all(&BTreeSet::new())
            .await
            .unwrap();
        assert!(resolved.is_empty());
    }
}
