use crate::commands::Commands;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "card-cli")]
#[clap(about = "Build Pokémon trainer cards for GitHub users", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}
