use sha2::{Digest, Sha256};

/// Synchronous prefixed digest for batch artifacts, e.g. `sha256_9f86…`.
pub fn hash_bytes(prefix: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{}_{}", prefix, hex::encode(hasher.finalize()))
}
