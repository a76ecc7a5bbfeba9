use clap::Subcommand;

mod create;
mod id;
mod theme;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Create(create::Create),
    Id(id::Id),
    Theme(theme::Theme),
}
