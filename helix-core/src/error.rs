//! Error types for helix-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing the config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config files and event frames that are not the expected JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Every problem found in a configuration, joined with `; `
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
