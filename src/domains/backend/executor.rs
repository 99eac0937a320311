//! Request Executor - one logical backend call.
//!
//! Builds the outbound HTTP request for a resolved identity, serves GETs
//! from the cache when possible, and otherwise runs the bounded retry loop.
//! Every failure mode (4xx, 5xx, transport) comes back as an
//! [`ExecutionResult`] value, never as an error.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{
    BASE_URL_HEADER, BackendIdentity, ERP_TOKEN_HEADER, ExecutionResult, Failure, FailureKind,
    HttpMethod, RetryPolicy, USER_ID_HEADER,
};
use crate::core::config::Config;
use crate::domains::cache::CacheStore;

/// Why a single attempt failed.
#[derive(Debug)]
struct AttemptError {
    kind: FailureKind,
    status: Option<u16>,
    message: String,
}

/// Executes backend calls with caching and retry.
pub struct RequestExecutor {
    client: reqwest::Client,
    cache: Arc<CacheStore>,
    retry: RetryPolicy,
    cache_ttl_secs: u64,
}

impl RequestExecutor {
    pub fn new(
        client: reqwest::Client,
        cache: Arc<CacheStore>,
        retry: RetryPolicy,
        cache_ttl_secs: u64,
    ) -> Self {
        debug!(
            "Executor: {} attempts, base delay {:?}, worst-case backoff {:?}",
            retry.max_attempts,
            retry.base_delay,
            retry.worst_case_delay()
        );
        Self {
            client,
            cache,
            retry,
            cache_ttl_secs: cache_ttl_secs.max(1),
        }
    }

    /// Build an executor (and its HTTP client) from configuration.
    pub fn from_config(config: &Config, cache: Arc<CacheStore>) -> crate::core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::new(
            client,
            cache,
            RetryPolicy::new(&config.retry),
            config.cache.ttl_secs,
        ))
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute `method endpoint` against the identity's backend.
    #[instrument(skip(self, method, body, identity), fields(method = %method))]
    pub async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        identity: &BackendIdentity,
    ) -> ExecutionResult {
        let url = identity.url_for(endpoint);

        let cache_key = (method == HttpMethod::Get && self.cache.is_enabled())
            .then(|| CacheStore::key_for(identity.user_id(), &url));

        if let Some(key) = cache_key.as_deref() {
            if let Some(payload) = self.cache.get(key).await {
                info!("Cache hit: {}", key);
                return ExecutionResult::Success {
                    payload,
                    http_status: 200,
                    cached: true,
                    attempts: 0,
                };
            }
        }

        let headers = build_headers(identity);
        let max_attempts = self.retry.max_attempts;
        let mut attempts = 0;

        loop {
            attempts += 1;
            info!(
                "API request (attempt {}/{}): {} {}",
                attempts, max_attempts, method, url
            );

            match self.send(method, &url, body, &headers).await {
                Ok((status, payload)) => {
                    info!("API success: {} {} ({})", method, url, status);

                    if let Some(key) = cache_key.as_deref() {
                        if !payload.is_null() && self.cache.set(key, &payload, self.cache_ttl_secs).await {
                            debug!("Cached response: {}", key);
                        }
                    }

                    return ExecutionResult::Success {
                        payload,
                        http_status: status,
                        cached: false,
                        attempts,
                    };
                }
                Err(err) => {
                    warn!(
                        "API error (attempt {}/{}): {} [{}]",
                        attempts, max_attempts, err.message, err.kind
                    );

                    if !self.retry.should_retry(err.kind, method, attempts) {
                        if err.kind == FailureKind::ClientError {
                            info!("Not retrying - client error ({:?})", err.status);
                        }
                        return ExecutionResult::Failure(Failure {
                            kind: err.kind,
                            http_status: err.status,
                            message: format!("Failed after {} attempts: {}", attempts, err.message),
                            attempts,
                        });
                    }

                    let delay = self.retry.delay_for(attempts);
                    info!("Retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Make one HTTP call and classify its outcome.
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        headers: &HeaderMap,
    ) -> Result<(u16, Value), AttemptError> {
        let mut request = self.client.request(method.into(), url).headers(headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| AttemptError {
            kind: FailureKind::NetworkError,
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let success = response.status().is_success();
        let bytes = response.bytes().await.map_err(|e| AttemptError {
            kind: FailureKind::NetworkError,
            status: None,
            message: e.to_string(),
        })?;
        let payload = parse_payload(&bytes);

        if success {
            return Ok((status, payload));
        }

        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status code {}", status));

        Err(AttemptError {
            kind: FailureKind::from_status(Some(status)),
            status: Some(status),
            message,
        })
    }
}

/// Identity headers first, caller-forwarded headers last so they win.
fn build_headers(identity: &BackendIdentity) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = identity.auth_token() {
        insert_header(&mut headers, AUTHORIZATION.as_str(), &format!("Bearer {}", token));
        insert_header(&mut headers, ERP_TOKEN_HEADER, token);
    }
    insert_header(&mut headers, BASE_URL_HEADER, identity.base_url());
    if let Some(user_id) = identity.user_id() {
        insert_header(&mut headers, USER_ID_HEADER, user_id);
    }

    for (name, value) in identity.forwarded_headers() {
        insert_header(&mut headers, name, value);
    }

    headers
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => warn!("Skipping invalid outbound header '{}'", name),
    }
}

/// Empty body is `null`; a non-JSON body is kept as a string.
fn parse_payload(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
