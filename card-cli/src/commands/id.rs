use trainercard::SpeciesId;

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "id", about = "Print the species id a username maps to")]
pub struct Id {
    #[clap(help = "GitHub username")]
    username: String,
}

impl Id {
    pub fn run(&self) -> Result<(), AppError> {
        println!("{}", SpeciesId::derive(self.username.trim()));
        Ok(())
    }
}
