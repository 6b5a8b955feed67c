//! Core HTTP client with connection-level retry and compression.

use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{Authorization, RequestBody, RequestBuilder, RequestMethod};
use crate::response::Response;
use crate::retry::RetryPolicy;

/// HTTP transport for the Zoho Analytics APIs.
///
/// Server errors (500, 502, 503, 504) and connection failures are retried
/// with exponential backoff according to [`ClientConfig::retry`]. Once the
/// retries run out the last response is handed back as-is, so callers can
/// still classify its body; a connection failure is returned as an error.
#[derive(Debug, Clone)]
pub struct ZaHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl ZaHttpClient {
    /// Create a new HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed);

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Put, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Delete, url)
    }

    /// Execute a request with connection-level retry handling.
    #[instrument(skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    pub async fn execute(&self, request: &RequestBuilder) -> Result<Response> {
        let mut retry_policy = self
            .config
            .retry
            .as_ref()
            .map(|c| RetryPolicy::new(c.clone()));

        loop {
            match self.execute_once(request).await {
                Ok(response) if is_retryable_status(response.status()) => {
                    let delay = retry_policy.as_mut().and_then(|p| p.next_delay());
                    match delay {
                        Some(delay) => {
                            warn!(
                                status = response.status(),
                                delay_ms = delay.as_millis(),
                                "Server error, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => return Ok(response),
                    }
                }
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() => {
                    let delay = retry_policy.as_mut().and_then(|p| p.next_delay());
                    match delay {
                        Some(delay) => {
                            warn!(
                                delay_ms = delay.as_millis(),
                                error = %err,
                                "Request failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(err),
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Execute a single request without retry logic.
    async fn execute_once(&self, request: &RequestBuilder) -> Result<Response> {
        let url = request.full_url()?;
        let mut req = self.inner.request(request.method.to_reqwest(), url);

        if let Some(Authorization::OAuth(ref token)) = request.authorization {
            req = req.header("Authorization", format!("Zoho-oauthtoken {}", token));
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.body(serde_json::to_vec(value)?),
                RequestBody::Text(text) => req.body(text.clone()),
                RequestBody::Bytes(bytes) => req.body(bytes.clone()),
                RequestBody::Form(fields) => req.body(serde_urlencoded::to_string(fields)?),
                RequestBody::Multipart { fields, file } => {
                    let mut part = reqwest::multipart::Part::bytes(file.content.to_vec())
                        .file_name(file.file_name.clone());
                    if let Some(ref mime) = file.mime {
                        part = part.mime_str(mime)?;
                    }
                    let mut form = reqwest::multipart::Form::new();
                    for (name, value) in fields {
                        form = form.text(name.clone(), value.clone());
                    }
                    req.multipart(form.part(file.field.clone(), part))
                }
            };
        }

        if self.config.enable_tracing {
            debug!(method = request.method.as_str(), url = %request.url, "Sending request");
        }

        let response = req.send().await?;
        let response = Response::read(response).await?;

        if self.config.enable_tracing {
            let status = response.status();
            let content_length = response.body().len();
            if response.is_success() {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        Ok(response)
    }
}

/// Statuses retried at the connection level.
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 500 | 502 | 503 | 504)
}
