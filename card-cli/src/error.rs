use std::io;
use std::path::PathBuf;

use thiserror::Error;
use trainercard::CardError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Couldn't load config from {0}: {1}")]
    ConfigLoadError(PathBuf, String),

    #[error("Output directory {0} does not exist")]
    OutputDirNotFound(PathBuf),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    CardError(#[from] CardError),
}
