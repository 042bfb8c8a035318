//! HTTP utilities for cluster REST calls

use crate::error::{ProvisionError, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid flooding logs with bulk responses)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... [truncated, {} bytes total]", &body[..cut], body.len()),
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Extract a human readable reason from a cluster error body
///
/// The cluster reports failures as `{"error": {"reason": ...}}`, or
/// `{"error": "..."}` for some endpoints. Anything else is returned sanitized.
pub fn error_reason(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let reason = parsed.as_ref().and_then(|v| {
        let error = v.get("error")?;
        error
            .get("reason")
            .and_then(|r| r.as_str())
            .or_else(|| error.as_str())
            .map(|s| s.to_string())
    });

    reason.unwrap_or_else(|| sanitize_for_log(body))
}

/// Request body sent to the cluster
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// A single JSON document
    Json(&'a str),
    /// Newline-delimited JSON, as expected by the bulk endpoints
    NdJson(&'a str),
}

impl Payload<'_> {
    fn content_type(&self) -> &'static str {
        match self {
            Payload::Json(_) => "application/json",
            Payload::NdJson(_) => "application/x-ndjson",
        }
    }

    fn body(&self) -> String {
        match self {
            Payload::Json(body) => body.to_string(),
            Payload::NdJson(body) => {
                // The bulk API rejects a body whose last line is not terminated
                if body.ends_with('\n') {
                    body.to_string()
                } else {
                    format!("{}\n", body)
                }
            }
        }
    }
}

/// Status and raw body of a cluster response
#[derive(Debug, Clone)]
pub struct ClusterResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ClusterResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Parse the body as JSON (None for empty or non-JSON bodies)
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Whether the body carries something other than an empty object
    pub fn has_payload(&self) -> bool {
        let trimmed = self.body.trim();
        !trimmed.is_empty() && trimmed != "{}"
    }

    /// False only when the cluster explicitly answered `acknowledged: false`
    pub fn is_acknowledged(&self) -> bool {
        self.json()
            .and_then(|v| v.get("acknowledged").and_then(|a| a.as_bool()))
            .unwrap_or(true)
    }
}

/// HTTP client wrapper for cluster API calls
#[derive(Clone)]
pub struct ClusterHttpClient {
    client: Client,
}

impl ClusterHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("esbootstrap/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client })
    }

    /// Send a request and return the status and body, whatever the status
    ///
    /// HTTP error statuses are not errors at this level: existence probes
    /// need to see a 404. Only transport failures are reported as `Err`.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Option<Payload<'_>>,
    ) -> Result<ClusterResponse> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(payload) = payload {
            request = request
                .header(reqwest::header::CONTENT_TYPE, payload.content_type())
                .body(payload.body());
        }

        let transport = |source: reqwest::Error| ProvisionError::Transport {
            method: method.to_string(),
            path: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() && status != StatusCode::NOT_FOUND {
            tracing::debug!("{} {} -> {} - {}", method, url, status, sanitize_for_log(&body));
        } else {
            tracing::trace!("{} {} -> {}", method, url, status);
        }

        Ok(ClusterResponse { status, body })
    }
}
