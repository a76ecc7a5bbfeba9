use clap::Parser;

mod cli;
mod commands;
mod error;

pub use error::AppError;

use cli::Cli;
use commands::Commands;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Cli::parse();

    let result = match &args.command {
        Commands::Create(create) => create.run().await,
        Commands::Id(id) => id.run(),
        Commands::Theme(theme) => theme.run(),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
