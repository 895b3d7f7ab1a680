//! Parameter store endpoints

use async_trait::async_trait;
use ferry_core::ParameterError;
use ferry_core::domain::parameter::{ConfigValue, ParameterKey, ParameterStore};
use ferry_core::dto::parameter::ParameterRecord;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{HttpParameterStore, handle_response};

impl HttpParameterStore {
    /// Fetch the raw record for a key
    ///
    /// Issues `GET {base}/parameters/{key}` with the key's leading slash
    /// dropped.
    pub async fn fetch_record(&self, key: &ParameterKey) -> Result<ParameterRecord> {
        let url = format!(
            "{}/parameters/{}",
            self.base_url,
            key.as_str().trim_start_matches('/')
        );
        debug!("Fetching parameter {} from {}", key, url);

        let response = self.client.get(&url).send().await?;
        let record: ParameterRecord = handle_response(response).await?;

        if record.name != key.as_str() {
            return Err(ClientError::ParseError(format!(
                "Parameter store answered '{}' for '{}'",
                record.name, key
            )));
        }

        Ok(record)
    }
}

#[async_trait]
impl ParameterStore for HttpParameterStore {
    async fn get_parameter(
        &self,
        key: &ParameterKey,
    ) -> std::result::Result<ConfigValue, ParameterError> {
        self.fetch_record(key)
            .await
            .map(|record| ConfigValue {
                key: key.clone(),
                value: record.value,
            })
            .map_err(|e| to_parameter_error(key, e))
    }
}

/// Map a client failure onto the parameter store contract
fn to_parameter_error(key: &ParameterKey, err: ClientError) -> ParameterError {
    if err.is_not_found() {
        ParameterError::NotFound(key.to_string())
    } else if err.is_forbidden() {
        ParameterError::PermissionDenied(key.to_string())
    } else {
        ParameterError::Unavailable {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ParameterKey {
        ParameterKey::parse("/ns/pool_id").unwrap()
    }

    #[test]
    fn test_not_found_mapping() {
        let err = to_parameter_error(&key(), ClientError::api_error(404, "no such key"));
        assert_eq!(err, ParameterError::NotFound("/ns/pool_id".to_string()));
    }

    #[test]
    fn test_forbidden_mapping() {
        let err = to_parameter_error(&key(), ClientError::api_error(403, "denied"));
        assert_eq!(err, ParameterError::PermissionDenied("/ns/pool_id".to_string()));

        let err = to_parameter_error(&key(), ClientError::api_error(401, "no credentials"));
        assert_eq!(err, ParameterError::PermissionDenied("/ns/pool_id".to_string()));
    }

    #[test]
    fn test_other_failures_are_unavailable() {
        let err = to_parameter_error(&key(), ClientError::api_error(500, "boom"));
        assert!(matches!(err, ParameterError::Unavailable { ref reason, .. } if reason.contains("boom")));

        let err = to_parameter_error(&key(), ClientError::ParseError("bad json".to_string()));
        assert!(matches!(err, ParameterError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        // Port 9 (discard) is not expected to serve HTTP
        let store = HttpParameterStore::new("http://127.0.0.1:9");
        let result = store.get_parameter(&key()).await;
        assert!(matches!(result, Err(ParameterError::Unavailable { .. })));
    }
}
