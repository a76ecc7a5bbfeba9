use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::CardClient;
use crate::id::SpeciesId;
use crate::theme::TypeName;
use crate::{CardError, Result, Source};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedRef,
}

impl TypeSlot {
    pub fn name(&self) -> &str {
        &self.kind.name
    }
}

/// Creature data for one species id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
}

impl Species {
    pub fn sprite_url(&self) -> Option<&str> {
        self.sprites
            .front_default
            .as_deref()
            .filter(|url| !url.is_empty())
    }

    /// Types ordered by slot, primary first.
    pub fn sorted_types(&self) -> Vec<&TypeSlot> {
        let mut types: Vec<&TypeSlot> = self.types.iter().collect();
        types.sort_by_key(|t| t.slot);
        types
    }

    /// Name of the lowest-slot type.
    pub fn primary_type(&self) -> Option<&str> {
        self.types
            .iter()
            .min_by_key(|t| t.slot)
            .map(TypeSlot::name)
    }

    /// Primary type, if it is one of the known eighteen.
    pub fn primary_type_name(&self) -> Option<TypeName> {
        self.primary_type()?.parse().ok()
    }

    /// Species name with the first letter upper-cased.
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Fetches creature data for `id`.
pub async fn fetch_species(client: &CardClient, id: SpeciesId) -> Result<Species> {
    let url = client.species_url(id.get())?;
    let response = CardClient::send(client.get(url)).await?;

    match response.status() {
        StatusCode::NOT_FOUND => Err(CardError::NotFound(Source::Species)),
        status if !status.is_success() => Err(CardError::Upstream {
            origin: Source::Species,
            status: status.as_u16(),
        }),
        _ => {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
    }
}
