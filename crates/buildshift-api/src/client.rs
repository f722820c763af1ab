//! The shared HTTP client.
//!
//! One [`ApiClient`] is built at startup from the dashboard config and
//! injected into the data layer. All request/response plumbing lives here;
//! endpoint modules only describe paths, query params, and payload shapes.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Duration;
use tracing::debug;

use buildshift_core::config::Config;
use buildshift_core::error::{BuildShiftError, Result};

/// HTTP client for the BuildShift backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    /// Build a client from the dashboard config.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                BuildShiftError::internal(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// The configured backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON body from `path` with the given query params.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!(path, "GET");

        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(path, e))?;

        let response = Self::check_status(path, response).await?;
        response
            .json()
            .await
            .map_err(|e| BuildShiftError::backend_response(path, e.to_string()))
    }

    /// POST a JSON body to `path`, returning the response body.
    ///
    /// Endpoints that reply with an empty body yield `Value::Null`.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<Value> {
        debug!(path, "POST");

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(path, e))?;

        let response = Self::check_status(path, response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| BuildShiftError::backend_response(path, e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| BuildShiftError::backend_response(path, e.to_string()))
    }

    /// Map non-success statuses to a backend error carrying the body.
    async fn check_status(path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BuildShiftError::BackendStatus {
            endpoint: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    /// Map transport-level failures, distinguishing timeouts.
    fn map_send_error(&self, path: &str, err: reqwest::Error) -> BuildShiftError {
        if err.is_timeout() {
            BuildShiftError::RequestTimeout {
                endpoint: path.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            BuildShiftError::request(path, err.to_string())
        }
    }
}
