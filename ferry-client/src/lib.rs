//! Ferry Clients
//!
//! Clients for the external collaborators Ferry reads from while composing
//! or diagnosing a descriptor:
//! - `HttpParameterStore`: the shared parameter store over HTTP
//! - `FileParameterStore`: a local JSON snapshot of parameters
//! - `RepositoryProbe`: read-only reachability check for the source repository
//!
//! # Example
//!
//! ```no_run
//! use ferry_client::HttpParameterStore;
//! use ferry_core::domain::parameter::{ParameterKey, ParameterStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = HttpParameterStore::new("http://localhost:8700");
//!     let key = ParameterKey::parse("/MyApp/agent_api")?;
//!
//!     let value = store.get_parameter(&key).await?;
//!     println!("{} = {}", value.key, value.value);
//!     Ok(())
//! }
//! ```

pub mod error;
mod file_store;
mod parameters;
mod repository;

pub use error::{ClientError, Result};
pub use file_store::FileParameterStore;
pub use repository::{GITHUB_API_URL, RepositoryProbe};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the shared parameter store
#[derive(Debug, Clone)]
pub struct HttpParameterStore {
    /// Base URL of the parameter store (e.g., "http://localhost:8700")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl HttpParameterStore {
    /// Create a new parameter store client
    ///
    /// # Example
    /// ```
    /// use ferry_client::HttpParameterStore;
    ///
    /// let store = HttpParameterStore::new("http://localhost:8700");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new parameter store client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use ferry_client::HttpParameterStore;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let store = HttpParameterStore::with_client("http://localhost:8700", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the parameter store
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Handle an API response and deserialize JSON
///
/// Checks the status code and returns an appropriate error if the request
/// failed, or deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}
