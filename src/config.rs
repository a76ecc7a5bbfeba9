use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::endpoint_url;
use crate::{CardError, Result};

pub const DEFAULT_PROFILE_ENDPOINT: &str = "https://api.github.com/users";
pub const DEFAULT_SPECIES_ENDPOINT: &str = "https://pokeapi.co/api/v2/pokemon";
pub const DEFAULT_USER_AGENT: &str = "trainercard";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Endpoints and transport settings for the card engine.
///
/// Persisted as TOML; every field is optional in the file and falls back to
/// the public GitHub and PokéAPI endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Base of `GET {profile_endpoint}/{username}` and its public events.
    pub profile_endpoint: Url,
    /// Base of `GET {species_endpoint}/{id}`.
    pub species_endpoint: Url,
    /// Same-origin relay for the events request, `GET {relay}/{username}`.
    pub relay_endpoint: Option<Url>,
    /// Bearer token for GitHub-bound requests.
    pub token: Option<String>,
    pub user_agent: String,
    /// Per-request timeout, `0` disables it.
    pub timeout_secs: u64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            profile_endpoint: Url::parse(DEFAULT_PROFILE_ENDPOINT)
                .expect("default profile endpoint is a valid URL"),
            species_endpoint: Url::parse(DEFAULT_SPECIES_ENDPOINT)
                .expect("default species endpoint is a valid URL"),
            relay_endpoint: None,
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CardConfig {
    /// Load a config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: CardConfig = toml::from_str(&content)?;
        log::debug!("loaded config from {}", path.as_ref().display());
        config.validate()?;
        Ok(config)
    }

    /// Point both GitHub and PokéAPI requests at the same base, e.g. a
    /// local mirror: `{base}/users` and `{base}/pokemon`.
    pub fn with_base(base: &Url) -> Result<Self> {
        Ok(Self {
            profile_endpoint: endpoint_url(base, &["users"])?,
            species_endpoint: endpoint_url(base, &["pokemon"])?,
            ..Self::default()
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    fn validate(&self) -> Result<()> {
        let endpoints = [
            Some(&self.profile_endpoint),
            Some(&self.species_endpoint),
            self.relay_endpoint.as_ref(),
        ];
        for url in endpoints.into_iter().flatten() {
            if url.cannot_be_a_base() {
                return Err(CardError::Config(format!(
                    "{url} cannot be used as an endpoint base"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        let dir = TempDir::new("card_config").unwrap();
        let path = dir.path().join("card.toml");
        std::fs::File::create(&path).unwrap();

        let config = CardConfig::load(&path).unwrap();
        assert_eq!(config, CardConfig::default());
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn partial_file_overrides_fields() {
        let dir = TempDir::new("card_config").unwrap();
        let path = dir.path().join("card.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "relay_endpoint = \"http://localhost:3000/api/github/events\"\n\
             timeout_secs = 0"
        )
        .unwrap();

        let config = CardConfig::load(&path).unwrap();
        assert_eq!(
            config.relay_endpoint.as_ref().map(Url::as_str),
            Some("http://localhost:3000/api/github/events")
        );
        assert_eq!(config.timeout(), None);
        assert_eq!(config.species_endpoint.as_str(), DEFAULT_SPECIES_ENDPOINT);
    }

    #[test]
    fn rejects_opaque_endpoints() {
        let dir = TempDir::new("card_config").unwrap();
        let path = dir.path().join("card.toml");
        std::fs::write(&path, "profile_endpoint = \"mailto:someone@example.com\"")
            .unwrap();

        assert!(matches!(
            CardConfig::load(&path),
            Err(CardError::Config(_))
        ));
    }

    #[rstest]
    #[case("http://mirror.example/api", "http://mirror.example/api/users")]
    #[case("http://mirror.example/api/", "http://mirror.example/api/users")]
    #[case("http://127.0.0.1:8080/", "http://127.0.0.1:8080/users")]
    #[case("http://127.0.0.1:8080", "http://127.0.0.1:8080/users")]
    fn base_path_is_extended(#[case] base: &str, #[case] profiles: &str) {
        let config = CardConfig::with_base(&Url::parse(base).unwrap()).unwrap();
        assert_eq!(config.profile_endpoint.as_str(), profiles);
        assert_eq!(
            config.species_endpoint.as_str(),
            profiles.replace("/users", "/pokemon")
        );
    }

    #[test]
    fn opaque_base_is_rejected() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            CardConfig::with_base(&base),
            Err(CardError::Config(_))
        ));
    }

    #[test]
    fn blank_token_is_dropped() {
        let config = CardConfig::default().with_token(Some("  ".into()));
        assert!(config.token.is_none());
    }
}
