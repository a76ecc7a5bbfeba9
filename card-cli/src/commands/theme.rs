use trainercard::{Theme as CardTheme, TypeName};

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "theme", about = "Print the gradient of a creature type")]
pub struct Theme {
    #[clap(help = "Lowercase type name, e.g. `fire`; omit to list all")]
    kind: Option<String>,
}

impl Theme {
    pub fn run(&self) -> Result<(), AppError> {
        match &self.kind {
            Some(kind) => {
                let name: TypeName = kind
                    .parse()
                    .map_err(|_| AppError::UnknownType(kind.clone()))?;
                println!("{}", line(name.as_str(), name.theme()));
            }
            None => {
                println!("{}", line("default", CardTheme::DEFAULT));
                for name in TypeName::ALL {
                    println!("{}", line(name.as_str(), name.theme()));
                }
            }
        }
        Ok(())
    }
}

fn line(label: &str, theme: CardTheme) -> String {
    format!("{label:<10} {} -> {}", theme.from, theme.to)
}
