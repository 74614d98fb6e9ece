use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// One persisted cache entry (one JSON file on disk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Original, unsanitized key.
    pub key: String,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub ttl_seconds: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, data: Vec<u8>, ttl_seconds: u64) -> Self {
        Self {
            key: key.into(),
            data,
            ttl_seconds,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// `created_at + ttl`, or `None` if that lies beyond the representable range.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let ttl = i64::try_from(self.ttl_seconds).ok()?;
        self.created_at.checked_add(Duration::seconds(ttl))
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        match self.expires_at() {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
