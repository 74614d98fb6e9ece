pub mod config;
pub mod entry;
pub mod error;
pub mod fs;
pub mod store;

pub use config::{default_cache_dir, CacheConfig};
pub use entry::CacheEntry;
pub use error::CacheError;
pub use store::{CacheStats, FileCache};
