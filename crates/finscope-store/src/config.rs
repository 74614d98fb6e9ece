use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TTL_SECONDS: u64 = 3600;
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// Return the default cache directory: `<user cache dir>/finscope/queries`.
/// Falls back to `~/.finscope/cache/queries`, then to a relative directory.
pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("finscope").join("queries")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".finscope").join("cache").join("queries")
    } else {
        PathBuf::from(".finscope-cache")
    }
}

/// Settings for [`crate::FileCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub enabled: bool,
    pub ttl_seconds: u64,
    /// Size budget in megabytes. Advisory: the store reports overflow but
    /// never evicts on its own. Zero disables the check.
    pub max_size_mb: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            max_size_mb: DEFAULT_MAX_SIZE_MB,
        }
    }
}
