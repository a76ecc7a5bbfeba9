//! Relay for the public events request.
//!
//! The relay forwards the upstream GitHub response verbatim, except that a
//! 403 caused by rate limiting is turned into a 429 with a structured body,
//! so callers can tell quota exhaustion apart from a forbidden resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::CardClient;
use crate::Result;

pub const RATE_LIMITED: &str = "rate_limited";
pub const NO_STORE: &str = "no-store";

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Structured body of a reclassified rate-limit response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitBody {
    pub error: String,
    pub message: String,
}

/// Response the relay hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: String,
    pub cache_control: &'static str,
    /// Upstream bytes, untouched unless the response was reclassified.
    pub body: Vec<u8>,
}

/// Apply the relay's pass-through rules to an upstream response.
pub fn reclassify(status: u16, content_type: Option<&str>, body: &[u8]) -> RelayResponse {
    if status == 403 {
        if let Some(message) = upstream_rate_limit(body) {
            let body = RateLimitBody {
                error: RATE_LIMITED.to_owned(),
                message,
            };
            return RelayResponse {
                status: 429,
                content_type: DEFAULT_CONTENT_TYPE.to_owned(),
                cache_control: NO_STORE,
                body: serde_json::to_vec(&body).unwrap_or_default(),
            };
        }
    }

    RelayResponse {
        status,
        content_type: content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_owned(),
        cache_control: NO_STORE,
        body: body.to_vec(),
    }
}

/// The upstream message of a GitHub rate-limit rejection, if `body` is one.
fn upstream_rate_limit(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let message = match json.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    message
        .to_lowercase()
        .contains("rate limit")
        .then_some(message)
}

/// Detect a rate-limit rejection from either side of the relay: a
/// reclassified 429 or a direct upstream 403.
pub fn rate_limit_message(status: u16, body: &[u8]) -> Option<String> {
    match status {
        429 => serde_json::from_slice::<RateLimitBody>(body)
            .ok()
            .filter(|b| b.error == RATE_LIMITED)
            .map(|b| b.message),
        403 => upstream_rate_limit(body),
        _ => None,
    }
}

/// Perform the upstream events request for `username` and reclassify it.
pub async fn forward(client: &CardClient, username: &str) -> Result<RelayResponse> {
    let url = client.profile_url(username, &["events", "public"])?;
    let response = CardClient::send(client.github_get(url)?).await?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.bytes().await?;

    let relayed = reclassify(status, content_type.as_deref(), &body);
    if relayed.status != status {
        log::warn!("upstream rate limit for {username}, relaying {}", relayed.status);
    }
    Ok(relayed)
}
