//! Content-addressed embedding keys.
//!
//! Identical content always maps to the same key, which is what makes the
//! dedup cache work. Storages that keep raw content use it verbatim;
//! otherwise a blake3 digest keeps sensitive text out of the database.

/// Compute the embedding key for `content` under the storage's key policy.
pub fn content_key(content: &str, store_content: bool) -> String {
    if store_content {
        content.to_string()
    } else {
        digest(content)
    }
}

/// Stable, collision-resistant content digest (blake3, hex).
pub fn digest(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}
