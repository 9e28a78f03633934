use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MvsatError {
    #[error("unknown invoice status label: {0:?}")]
    UnknownStatus(String),

    #[error("invalid utc offset {0:?} (expected e.g. \"-03:00\")")]
    InvalidUtcOffset(String),

    #[error("generated window must be >= 0 days, got {0}")]
    InvalidWindow(i64),

    #[error("revalidation interval must be > 0 seconds")]
    InvalidInterval,

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
