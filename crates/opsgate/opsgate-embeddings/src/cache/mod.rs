mod l1_memory;

pub use l1_memory::L1MemoryCache;

/// Cache key for a normalized text.
pub fn content_key(normalized: &str) -> String {
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}
