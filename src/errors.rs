use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CardError>;

/// Remote data source a fetch error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Profile,
    Activity,
    Species,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Profile => write!(f, "GitHub user"),
            Source::Activity => write!(f, "GitHub events"),
            Source::Species => write!(f, "Pokémon"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Username is empty")]
    EmptyUsername,
    #[error("{0} not found")]
    NotFound(Source),
    #[error("Failed to load {origin}: upstream returned {status}")]
    Upstream { origin: Source, status: u16 },
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Inline error: {0}")]
    Inline(String),
    #[error("Export error: {0}")]
    Export(#[from] ExportFailure),
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parsing error")]
    Parse,
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ExportFailure {
    #[error("card has not been rendered yet")]
    NoSurface,
    #[error("card surface could not be parsed: {0}")]
    Surface(String),
    #[error("card could not be rasterized: {0}")]
    Raster(String),
    #[error("card references a remote image: {0}")]
    RemoteAsset(String),
}

impl From<serde_json::Error> for CardError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}

impl From<url::ParseError> for CardError {
    fn from(value: url::ParseError) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<toml::de::Error> for CardError {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value.to_string())
    }
}

/// Severity-tagged result of one data channel of a submission.
///
/// Primary fetches (profile, species) report failures to the user, the
/// activity side channel swallows them.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    SilentFail(CardError),
    SurfacedFail(CardError),
}

impl<T> Outcome<T> {
    pub fn surfaced(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(e) => Outcome::SurfacedFail(e),
        }
    }

    pub fn silent(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(e) => Outcome::SilentFail(e),
        }
    }

    /// Message for the user-visible error channel, if any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Outcome::SurfacedFail(e) => Some(e.to_string()),
            _ => None,
        }
    }
}
