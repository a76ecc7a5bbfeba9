use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use url::Url;

use crate::config::CardConfig;
use crate::{CardError, Result};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Shared HTTP client plus the endpoints it talks to. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CardClient {
    http: reqwest::Client,
    config: Arc<CardConfig>,
}

impl CardClient {
    pub fn new(config: CardConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| CardError::Config("invalid user agent".into()))?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// `{profile_endpoint}/{username}/{rest...}`, each segment escaped.
    pub fn profile_url(&self, username: &str, rest: &[&str]) -> Result<Url> {
        let mut segments = vec![username];
        segments.extend_from_slice(rest);
        endpoint_url(&self.config.profile_endpoint, &segments)
    }

    pub fn species_url(&self, id: u32) -> Result<Url> {
        endpoint_url(&self.config.species_endpoint, &[&id.to_string()])
    }

    pub fn relay_url(&self, username: &str) -> Result<Option<Url>> {
        self.config
            .relay_endpoint
            .as_ref()
            .map(|base| endpoint_url(base, &[username]))
            .transpose()
    }

    /// GET against the GitHub API, with the bearer token when configured.
    pub fn github_get(&self, url: Url) -> Result<RequestBuilder> {
        let mut request = self.http.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| CardError::Config("invalid token value".into()))?;
            request = request.header(AUTHORIZATION, value);
        }
        Ok(request)
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.http.get(url)
    }

    pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        log::debug!("{} {}", response.status(), response.url());
        Ok(response)
    }
}

pub(crate) fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CardError::Config(format!("{base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_escaped() {
        let client = CardClient::new(CardConfig::default()).unwrap();
        let url = client.profile_url("a b/c", &["events", "public"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/users/a%20b%2Fc/events/public"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let config = CardConfig {
            species_endpoint: Url::parse("https://pokeapi.co/api/v2/pokemon/").unwrap(),
            ..CardConfig::default()
        };
        let client = CardClient::new(config).unwrap();
        assert_eq!(
            client.species_url(25).unwrap().as_str(),
            "https://pokeapi.co/api/v2/pokemon/25"
        );
    }

    #[test]
    fn relay_is_optional() {
        let client = CardClient::new(CardConfig::default()).unwrap();
        assert!(client.relay_url("octocat").unwrap().is_none());
    }
}
