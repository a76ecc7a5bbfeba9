use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::CardClient;
use crate::relay;
use crate::{CardError, Result, Source};

const PUSH_EVENT: &str = "PushEvent";

/// Public GitHub profile fields shown on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn account_age_days(&self) -> u64 {
        self.account_age_days_at(Utc::now())
    }

    /// Whole days between account creation and `now`, never negative.
    pub fn account_age_days_at(&self, now: DateTime<Utc>) -> u64 {
        now.signed_duration_since(self.created_at)
            .num_days()
            .max(0) as u64
    }

    /// Avatar URL, treating an empty string as absent.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Fetches the GitHub profile of `username`.
pub async fn fetch_profile(client: &CardClient, username: &str) -> Result<Profile> {
    let url = client.profile_url(username, &[])?;
    let response = CardClient::send(client.github_get(url)?).await?;

    match response.status() {
        StatusCode::NOT_FOUND => Err(CardError::NotFound(Source::Profile)),
        status if !status.is_success() => Err(CardError::Upstream {
            origin: Source::Profile,
            status: status.as_u16(),
        }),
        _ => {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
    }
}

/// Counts commits pushed in the most recent page of public events of
/// `username`.
///
/// Requests go through the relay when one is configured.
pub async fn fetch_activity_summary(client: &CardClient, username: &str) -> Result<u64> {
    let request = match client.relay_url(username)? {
        Some(url) => client.get(url),
        None => client.github_get(client.profile_url(username, &["events", "public"])?)?,
    };
    let response = CardClient::send(request).await?;

    let status = response.status();
    let body = response.text().await?;
    if let Some(message) = relay::rate_limit_message(status.as_u16(), body.as_bytes()) {
        return Err(CardError::RateLimited(message));
    }
    if !status.is_success() {
        return Err(CardError::Upstream {
            origin: Source::Activity,
            status: status.as_u16(),
        });
    }

    let events: Vec<Value> = serde_json::from_str(&body)?;
    Ok(summarize_commits(&events))
}

/// Sums `payload.commits` lengths over push events.
///
/// Events that are not objects, are not pushes, or carry no commit array
/// contribute nothing.
pub fn summarize_commits(events: &[Value]) -> u64 {
    events
        .iter()
        .filter(|event| event.get("type").and_then(Value::as_str) == Some(PUSH_EVENT))
        .map(|event| {
            event
                .pointer("/payload/commits")
                .and_then(Value::as_array)
                .map_or(0, |commits| commits.len() as u64)
        })
        .sum()
}
