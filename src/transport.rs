//! Network request seam and its reqwest implementation.
//!
//! Every backend call goes through `NetworkRequest::request`, with the
//! endpoint as an opaque string and the caller's cancellation token. The
//! transport reports failures as `RawError`; classification happens above it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{ConfigError, HttpConfig};
use crate::error::RawError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// `(endpoint, method, body, cancellation) -> response`.
///
/// Implementations must observe `cancel` and return `RawError::Cancelled`
/// promptly once it fires.
#[async_trait]
pub trait NetworkRequest: Send + Sync {
    async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, RawError>;
}

// =============================================================================
// HTTP TRANSPORT
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// `request_timeout` is a transport-level backstop; the retry policy's own
    /// per-attempt timeout normally fires first.
    pub fn new(config: &HttpConfig, request_timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), api_key: config.api_key.clone() })
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send(&self, endpoint: &str, method: Method, body: Option<&Value>) -> Result<Value, RawError> {
        let url = self.url_for(endpoint);
        let mut request = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_send_error)?;
        debug!(endpoint, status, bytes = text.len(), "backend response");

        if !(200..300).contains(&status) {
            return Err(RawError::Http { status, body: text });
        }
        parse_body(&text)
    }
}

#[async_trait]
impl NetworkRequest for HttpTransport {
    async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, RawError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(RawError::Cancelled),
            res = self.send(endpoint, method, body) => res,
        }
    }
}

fn map_send_error(e: reqwest::Error) -> RawError {
    if e.is_timeout() {
        return RawError::message(format!("request timed out: {e}"));
    }
    if e.is_connect() {
        return RawError::message(format!("network connection failed: {e}"));
    }
    RawError::message(format!("network request failed: {e}"))
}

/// Empty bodies decode as `null`; anything else must be JSON.
fn parse_body(text: &str) -> Result<Value, RawError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| RawError::MalformedResponse(format!("response is not JSON: {e}")))
}
