// src/storage/http.rs

use super::{ObjectStore, validate_key};
use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Object store reached over plain HTTP
///
/// Objects are fetched with `GET <base_url>/<key>` and stored with
/// `PUT <base_url>/<key>`. A 404 response means the object does not exist.
/// No retries are attempted here.
pub struct HttpStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpStore {
    /// Create a store with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, HTTP_TIMEOUT, None)
    }

    /// Create a store with a custom timeout and optional bearer token
    pub fn with_options(
        base_url: &str,
        timeout: Duration,
        auth_token: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    /// URL of an object
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn request(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl ObjectStore for HttpStore {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        let url = self.object_url(key);
        debug!("GET {}", url);

        let response = self
            .request(self.client.get(&url))
            .send()
            .map_err(|e| Error::StorageError {
                key: key.to_string(),
                reason: format!("GET {url} failed: {e}"),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFoundError(url)),
            status if !status.is_success() => Err(Error::StorageError {
                key: key.to_string(),
                reason: format!("HTTP {status} from {url}"),
            }),
            _ => {
                let bytes = response.bytes().map_err(|e| Error::StorageError {
                    key: key.to_string(),
                    reason: format!("failed to read response from {url}: {e}"),
                })?;
                Ok(bytes.to_vec())
            }
        }
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        validate_key(key)?;
        let url = self.object_url(key);
        debug!("PUT {} ({} bytes)", url, data.len());

        let response = self
            .request(self.client.put(&url))
            .body(data.to_vec())
            .send()
            .map_err(|e| Error::StorageError {
                key: key.to_string(),
                reason: format!("PUT {url} failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Error::StorageError {
                key: key.to_string(),
                reason: format!("HTTP {} from {url}", response.status()),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
