//! Error types for collaborator failures
//!
//! Nothing here is fatal to a running round: the session logs and swallows
//! these, the round's own clock decides when it ends.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VowelDropError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("storage is unavailable: {0}")]
    Storage(String),
    #[error("audio playback failed: {0}")]
    Audio(String),
    #[error("browser call failed: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, VowelDropError>;
