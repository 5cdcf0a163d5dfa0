use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SptError {
    #[error("snapshot `{name}` unavailable from cache and remote: {source:#}")]
    SnapshotUnavailable {
        name: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("proceedings record references volume {number} which is missing from `volumes`")]
    ProceedingsWithoutVolume { number: u32 },
    #[error("config invalid: {0}")]
    InvalidConfig(String),
    #[error("failed to write cache file {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SptResult<T> = Result<T, SptError>;
