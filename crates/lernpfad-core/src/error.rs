use thiserror::Error;

use crate::TargetId;

/// Fehler, die ein Kollaborateur (Datenbank, Speicher) melden kann.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    #[error("Unknown target: {0}")]
    UnknownTarget(TargetId),
}

pub type Result<T> = std::result::Result<T, StoreError>;
