use sha2::{Digest, Sha256};

/// Length of a content identifier: SHA-256 rendered as lowercase hex.
pub const CONTENT_ID_LEN: usize = 64;

/// Hash bytes into a content identifier (lowercase hex SHA-256).
pub fn content_id(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hash a sequence of fields into one identifier.
///
/// Each field is length-prefixed before it enters the digest, so
/// `["ab", "c"]` and `["a", "bc"]` never share an identifier. Field order
/// is significant.
pub fn content_id_of_fields<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for field in fields {
        let field = field.as_ref();
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field);
    }
    hex::encode(hasher.finalize())
}

/// True when `s` has the shape of a content identifier.
pub fn is_content_id(s: &str) -> bool {
    s.len() == CONTENT_ID_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
