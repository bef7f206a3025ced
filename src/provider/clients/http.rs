//! Shared HTTP plumbing for the REST and GraphQL clients.

use crate::error::ApiError;
use crate::provider::clients::ProviderCallError;
use crate::provider::ProviderKind;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;

/// Longest body excerpt kept in an error message.
const MAX_BODY_EXCERPT: usize = 512;

/// reqwest client bound to one provider kind. Building it performs no I/O.
pub struct HttpTransport {
    kind: ProviderKind,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(kind: ProviderKind, headers: HeaderMap, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ApiError::ConfigError(format!("Failed to build HTTP client for {}: {}", kind, e))
            })?;
        Ok(Self {
            kind,
            client,
            timeout,
        })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request and decode the JSON response. Empty bodies yield `None`.
    pub async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Option<Value>, ProviderCallError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        if !status.is_success() {
            return Err(translate_status(self.kind, operation, status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body).map(Some).map_err(|e| {
            ProviderCallError::new(
                self.kind,
                operation,
                format!("Response is not valid JSON: {}", e),
            )
            .with_status(status.as_u16())
        })
    }

    fn transport_error(&self, operation: &'static str, err: reqwest::Error) -> ProviderCallError {
        let message = if err.is_timeout() {
            format!("Request timed out after {}s", self.timeout.as_secs())
        } else if err.is_connect() {
            format!("Could not connect: {}", err)
        } else {
            err.to_string()
        };
        let call_error = ProviderCallError::new(self.kind, operation, message);
        match err.status() {
            Some(status) => call_error.with_status(status.as_u16()),
            None => call_error,
        }
    }
}

/// Translate a non-success HTTP response into a call error, keeping the
/// provider's own message when the body carries one.
pub fn translate_status(
    kind: ProviderKind,
    operation: &'static str,
    status: u16,
    body: &str,
) -> ProviderCallError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error", "hint"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| excerpt(body));

    let message = if message.is_empty() {
        "empty response body".to_string()
    } else {
        message
    };
    ProviderCallError::new(kind, operation, message).with_status(status)
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_BODY_EXCERPT).collect();
    format!("{}...", cut)
}

/// Header helper; marks the value sensitive so it never shows in debug output.
pub fn insert_header(
    headers: &mut HeaderMap,
    name: &'static str,
    value: &str,
    sensitive: bool,
) -> Result<(), ApiError> {
    let mut header = HeaderValue::from_str(value.trim()).map_err(|_| {
        ApiError::Validation(format!("Value for header {} contains invalid characters", name))
    })?;
    header.set_sensitive(sensitive);
    headers.insert(HeaderName::from_static(name), header);
    Ok(())
}

/// Validate and normalize an endpoint before any client is built.
pub fn require_endpoint(kind: ProviderKind, endpoint: &str) -> Result<String, ApiError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ApiError::Validation(format!("{} endpoint is not configured", kind)));
    }
    if !endpoint_url_is_valid(endpoint) {
        return Err(ApiError::Validation(format!(
            "Invalid {} endpoint URL: {}",
            kind, endpoint
        )));
    }
    Ok(endpoint.trim_end_matches('/').to_string())
}

/// An absolute http(s) URL with a host. Whether the host answers is left to
/// the first round trip.
pub fn endpoint_url_is_valid(endpoint: &str) -> bool {
    if endpoint.chars().any(char::is_whitespace) {
        return false;
    }
    match Url::parse(endpoint) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}
