//! Deterministic GitHub trainer cards.
//!
//! A username is mapped onto a first-generation species id, the GitHub
//! profile, recent push activity and the species data are fetched
//! concurrently, and the result is composed into a card themed after the
//! species' primary type. The card can be rasterized into a PNG that does
//! not depend on the network.

pub mod client;
pub mod composer;
pub mod config;
mod errors;
pub mod export;
pub mod id;
pub mod inline;
pub mod profile;
pub mod relay;
pub mod render;
pub mod species;
pub mod theme;

pub use client::CardClient;
pub use composer::{CardComposer, CardState, Phase, Slot};
pub use config::CardConfig;
pub use errors::{CardError, ExportFailure, Outcome, Result, Source};
pub use export::{card_filename, CardExporter, Export, RemoteAssets};
pub use id::SpeciesId;
pub use inline::{InlinedAsset, Provenance};
pub use render::{CardSurface, CardView};
pub use theme::{Theme, TypeName};

#[cfg(test)]
pub(crate) fn initialize() {
    let _ = env_logger::builder().is_test(true).try_init();
}
