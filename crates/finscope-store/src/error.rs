use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache disabled")]
    Disabled,
    #[error("cache entry not found: {0}")]
    NotFound(String),
    #[error("cache entry expired: {0}")]
    Expired(String),
    #[error("invalid cache key: key must not be empty")]
    InvalidKey,
    #[error("cache I/O failed at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed cache entry at {}", .path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    /// True for conditions a caller handles by going to the source of truth.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            CacheError::Disabled | CacheError::NotFound(_) | CacheError::Expired(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}
