//! HTTP client construction, auth headers and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::BriefError;

/// Per-request timeout applied by the HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build an HTTP client for one provider.
pub fn build_client() -> Result<reqwest::Client, BriefError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| BriefError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> Result<HeaderMap, BriefError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let value = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| BriefError::Configuration("API key is not a valid header value".into()))?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Build Anthropic-style headers (x-api-key).
pub fn anthropic_headers(api_key: &str, version: &str) -> Result<HeaderMap, BriefError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let key = HeaderValue::from_str(api_key)
        .map_err(|_| BriefError::Configuration("API key is not a valid header value".into()))?;
    headers.insert("x-api-key", key);
    headers.insert(
        "anthropic-version",
        HeaderValue::from_str(version)
            .map_err(|_| BriefError::Configuration(format!("invalid API version {version}")))?,
    );
    Ok(headers)
}

/// Reject blank credentials at construction time.
pub fn require_key(provider: &str, api_key: &str) -> Result<(), BriefError> {
    if api_key.trim().is_empty() {
        return Err(BriefError::Configuration(format!("{provider} API key is empty")));
    }
    Ok(())
}

/// Map a non-success HTTP status and body to an error.
pub fn status_to_error(status: u16, retry_after: Option<&str>, body: &str) -> BriefError {
    match status {
        401 | 403 => BriefError::Authentication(body.to_string()),
        429 => BriefError::RateLimited {
            retry_after_ms: retry_after
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|secs| (secs * 1000.0) as u64)
                .or_else(|| extract_retry_after(body)),
        },
        _ => BriefError::api(status, body),
    }
}

/// Read the response; non-2xx statuses become errors.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, BriefError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let retry_after = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.text().await.unwrap_or_default();
    Err(status_to_error(status.as_u16(), retry_after.as_deref(), &body))
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
