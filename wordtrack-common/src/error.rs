//! Error type shared by the WordTrack crates

use thiserror::Error;

use crate::db::WordId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `wordtrack.toml` could not be read, parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// No row with this id; it was never created or has been deleted
    #[error("Word {0} not found")]
    WordNotFound(WordId),

    /// Insert hit the UNIQUE constraint, yet the conflicting row was gone
    /// by the time its id was read back
    #[error("Word '{0}' conflicted on insert but no longer exists")]
    WordVanished(String),
}

impl Error {
    /// True when retrying as a first observation is the right recovery
    pub fn is_missing_word(&self) -> bool {
        matches!(self, Error::WordNotFound(_) | Error::WordVanished(_))
    }
}
