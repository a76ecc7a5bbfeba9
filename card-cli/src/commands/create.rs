use std::path::{Path, PathBuf};

use trainercard::{
    CardClient, CardComposer, CardConfig, CardExporter, CardState, RemoteAssets,
};
use url::Url;

use crate::AppError;

const TOKEN_VAR: &str = "GITHUB_TOKEN";

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "create", about = "Build a card and export it as PNG")]
pub struct Create {
    #[clap(help = "GitHub username")]
    username: String,
    #[clap(long, value_parser, help = "Directory to write the PNG into")]
    out: Option<PathBuf>,
    #[clap(long, value_parser, help = "TOML config file")]
    config: Option<PathBuf>,
    #[clap(long, help = "Serve GitHub and PokéAPI requests from one base URL")]
    base: Option<Url>,
    #[clap(long, help = "Relay endpoint for the events request")]
    relay: Option<Url>,
    #[clap(long, default_value_t = 1.0, help = "Pixel ratio of the PNG")]
    scale: f32,
    #[clap(long, help = "Fail instead of omitting images that were not inlined")]
    strict: bool,
}

impl Create {
    pub async fn run(&self) -> Result<(), AppError> {
        let out = self.out.clone().unwrap_or_else(|| PathBuf::from("."));
        if !out.is_dir() {
            return Err(AppError::OutputDirNotFound(out));
        }

        let config = self.resolve_config(std::env::var(TOKEN_VAR).ok())?;
        log::debug!(
            "profiles from {}, species from {}",
            config.profile_endpoint,
            config.species_endpoint
        );
        let composer = CardComposer::new(CardClient::new(config)?);

        println!("Building card for {}...", self.username.trim());
        composer.submit(&self.username)?;
        let state = composer.finished().await;
        print_summary(&state);

        let remote = if self.strict {
            RemoteAssets::Reject
        } else {
            RemoteAssets::Omit
        };
        let exporter = CardExporter::new()
            .with_scale(self.scale)
            .with_remote_assets(remote);
        let export = exporter.export(composer.surface().as_ref())?;
        let path = export.save_in(&out)?;
        println!("Card saved to {}", path.display());

        Ok(())
    }

    fn resolve_config(&self, token: Option<String>) -> Result<CardConfig, AppError> {
        let mut config = match (&self.config, &self.base) {
            (Some(path), _) => load_config(path)?,
            (None, Some(base)) => CardConfig::with_base(base)?,
            (None, None) => CardConfig::default(),
        };
        if let (Some(_), Some(base)) = (&self.config, &self.base) {
            let mirrored = CardConfig::with_base(base)?;
            config.profile_endpoint = mirrored.profile_endpoint;
            config.species_endpoint = mirrored.species_endpoint;
        }
        if self.relay.is_some() {
            config.relay_endpoint = self.relay.clone();
        }
        if config.token.is_none() {
            config = config.with_token(token);
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<CardConfig, AppError> {
    CardConfig::load(path)
        .map_err(|e| AppError::ConfigLoadError(path.to_owned(), e.to_string()))
}

fn print_summary(state: &CardState) {
    let view = state.view();
    if let Some(id) = state.species_id {
        println!("Species #{id}");
    }
    if let Some(login) = &view.login {
        println!("Trainer: {login}");
    }
    if let Some(name) = &view.species_name {
        println!("Partner: {name} ({})", view.types.join("/"));
    }
    for stat in &view.stats {
        match stat.value {
            Some(value) => println!("  {:<8} {value}", stat.label),
            None => println!("  {:<8} -", stat.label),
        }
    }
    if let Some(error) = &view.error {
        println!("Error: {error}");
    }
}
