//! Sync errors

/// Errors raised while talking to the helix backend
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("API returned status {status}")]
    Api { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Core(#[from] helix_core::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
