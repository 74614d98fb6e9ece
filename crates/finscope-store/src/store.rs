//! File-backed cache store.
//!
//! One JSON file per entry inside the cache directory, named from a
//! sanitized form of the key. Writes go through [`write_atomic`], so readers
//! in other processes never observe a partially written entry. There is no
//! cross-process locking: entries are keyed by content, last writer wins.

use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::fs::write_atomic;
use finscope_core::hash::content_id;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const ENTRY_EXT: &str = "json";
const MAX_STEM_LEN: usize = 128;

/// Aggregate view of the store's contents from a single directory scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub expired: usize,
    pub total_bytes: u64,
}

/// File-backed key/value cache with per-entry TTL.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    enabled: bool,
    ttl_seconds: u64,
    max_size_mb: u64,
}

impl FileCache {
    /// Open a cache rooted at `dir`. When enabled, the directory is created
    /// if absent. When disabled, nothing is touched.
    pub fn new(
        dir: impl Into<PathBuf>,
        enabled: bool,
        ttl_seconds: u64,
        max_size_mb: u64,
    ) -> Result<Self, CacheError> {
        let dir = dir.into();
        if !enabled {
            return Ok(Self::disabled(dir, ttl_seconds, max_size_mb));
        }
        fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;
        Ok(Self {
            dir,
            enabled,
            ttl_seconds,
            max_size_mb,
        })
    }

    /// A store that answers [`CacheError::Disabled`] to everything and
    /// never touches `dir`.
    pub fn disabled(dir: impl Into<PathBuf>, ttl_seconds: u64, max_size_mb: u64) -> Self {
        Self {
            dir: dir.into(),
            enabled: false,
            ttl_seconds,
            max_size_mb,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::new(
            &config.dir,
            config.enabled,
            config.ttl_seconds,
            config.max_size_mb,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Read the payload stored under `key`.
    pub fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        self.get_entry(key).map(|entry| entry.data)
    }

    /// Read the full entry stored under `key`. An expired entry is removed
    /// (best effort) and reported as [`CacheError::Expired`].
    pub fn get_entry(&self, key: &str) -> Result<CacheEntry, CacheError> {
        self.check(key)?;
        let path = self.entry_path(key);
        let entry = match read_entry(&path)? {
            Some(entry) if entry.key == key => entry,
            // Absent, or a different key that sanitizes to the same name.
            _ => return Err(CacheError::NotFound(key.to_string())),
        };
        if entry.is_expired() {
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove expired cache entry");
                }
            }
            tracing::debug!(key, "cache entry expired");
            return Err(CacheError::Expired(key.to_string()));
        }
        tracing::debug!(key, "cache hit");
        Ok(entry)
    }

    /// Store `data` under `key` with the store's default TTL.
    pub fn set(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        self.set_with_ttl(key, data, self.ttl_seconds)
    }

    pub fn set_with_ttl(&self, key: &str, data: &[u8], ttl_seconds: u64) -> Result<(), CacheError> {
        self.check(key)?;
        let entry = CacheEntry::new(key, data.to_vec(), ttl_seconds);
        let path = self.entry_path(key);
        let bytes = serde_json::to_vec(&entry).map_err(|e| CacheError::Serde {
            path: path.clone(),
            source: e,
        })?;
        write_atomic(&path, &bytes).map_err(|e| CacheError::io(&path, e))?;
        tracing::debug!(key, bytes = data.len(), ttl_seconds, "cache set");
        Ok(())
    }

    /// Remove the entry for `key`. Removing an absent key succeeds.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check(key)?;
        remove_if_present(&self.entry_path(key))
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.check_enabled()?;
        for path in self.entry_files()? {
            remove_if_present(&path)?;
        }
        Ok(())
    }

    /// Remove every expired entry. Returns how many were removed.
    /// Unreadable entries are skipped.
    pub fn cleanup_expired(&self) -> Result<usize, CacheError> {
        self.check_enabled()?;
        let mut removed = 0;
        for path in self.entry_files()? {
            match read_entry(&path) {
                Ok(Some(entry)) if entry.is_expired() => {
                    remove_if_present(&path)?;
                    removed += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable cache entry");
                }
            }
        }
        tracing::debug!(removed, "expired cache entries swept");
        Ok(removed)
    }

    /// Total bytes of all entry files.
    pub fn size(&self) -> Result<u64, CacheError> {
        self.check_enabled()?;
        let mut total = 0;
        for path in self.entry_files()? {
            total += file_len(&path)?;
        }
        Ok(total)
    }

    /// Number of entry files, expired or not.
    pub fn count(&self) -> Result<usize, CacheError> {
        self.check_enabled()?;
        Ok(self.entry_files()?.len())
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        self.check_enabled()?;
        let mut stats = CacheStats::default();
        for path in self.entry_files()? {
            stats.entries += 1;
            stats.total_bytes += file_len(&path)?;
            if let Ok(Some(entry)) = read_entry(&path) {
                if entry.is_expired() {
                    stats.expired += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Configured size budget in bytes (0 when unbounded). Writes never
    /// check it; callers poll [`FileCache::is_over_budget`].
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn is_over_budget(&self) -> Result<bool, CacheError> {
        let budget = self.max_size_bytes();
        Ok(budget > 0 && self.size()? > budget)
    }

    fn check_enabled(&self) -> Result<(), CacheError> {
        if self.enabled {
            Ok(())
        } else {
            Err(CacheError::Disabled)
        }
    }

    fn check(&self, key: &str) -> Result<(), CacheError> {
        self.check_enabled()?;
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{ENTRY_EXT}", file_stem_for_key(key)))
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let rd = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.dir, e)),
        };
        let mut files = Vec::new();
        for dirent in rd {
            let dirent = dirent.map_err(|e| CacheError::io(&self.dir, e))?;
            let name = dirent.file_name().to_string_lossy().to_string();
            // Skip in-flight temp files and anything that is not ours.
            if name.starts_with('.') || !name.ends_with(&format!(".{ENTRY_EXT}")) {
                continue;
            }
            if dirent.file_type().map(|t| t.is_file()).unwrap_or(false) {
                files.push(dirent.path());
            }
        }
        Ok(files)
    }
}

/// Map a key to a path-safe file stem. Anything outside `[A-Za-z0-9_-]`
/// becomes `_`. Overlong stems are cut and suffixed with the key's hash.
pub fn file_stem_for_key(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.len() <= MAX_STEM_LEN {
        stem
    } else {
        format!("{}-{}", &stem[..MAX_STEM_LEN - 65], content_id(key.as_bytes()))
    }
}

fn read_entry(path: &Path) -> Result<Option<CacheEntry>, CacheError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CacheError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| CacheError::Serde {
            path: path.to_path_buf(),
            source: e,
        })
}

fn remove_if_present(path: &Path) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::io(path, e)),
    }
}

fn file_len(path: &Path) -> Result<u64, CacheError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        // Removed by a concurrent sweep between listing and stat.
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
        Err(e) => Err(CacheError::io(path, e)),
    }
}
