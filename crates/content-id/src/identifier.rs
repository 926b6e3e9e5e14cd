use std::sync::Arc;

use tracing::warn;

use crate::cid::{Codec, ContentId};
use crate::errors::{IdentifierError, IdentifierResult};
use crate::primitive::{fallback_digest, primitive_for, HashAlgorithm, HashPrimitive};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Digest {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    pub fn new(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// True when the digest came from the non-cryptographic fallback.
    pub fn reduced_strength(&self) -> bool {
        !self.algorithm.is_cryptographic()
    }
}

pub struct ContentIdentifier {
    primitive: Arc<dyn HashPrimitive>,
}

impl ContentIdentifier {
    pub fn new(primitive: Arc<dyn HashPrimitive>) -> Self {
        Self { primitive }
    }

    pub fn for_algorithm(algorithm: HashAlgorithm) -> Self {
        Self::new(primitive_for(algorithm))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.primitive.algorithm()
    }

    /// Never fails: a primitive error degrades to the fallback digest.
    pub async fn hash(&self, payload: &[u8]) -> Digest {
        match self.primitive.digest(payload).await {
            Ok(bytes) => Digest::new(self.primitive.algorithm(), bytes),
            Err(err) => {
                warn!(
                    target: "excavator.content_id",
                    algorithm = %self.primitive.algorithm(),
                    %err,
                    "hash primitive failed; using reduced-strength fallback"
                );
                Digest::new(HashAlgorithm::Fallback, fallback_digest(payload).to_vec())
            }
        }
    }

    pub async fn hash_parts(&self, parts: &[&str]) -> IdentifierResult<Digest> {
        if parts.is_empty() {
            return Err(IdentifierError::MissingPayload);
        }
        Ok(self.hash(&frame_parts(parts)).await)
    }

    pub async fn to_cid(&self, payload: &[u8], codec: Codec) -> ContentId {
        let digest = self.hash(payload).await;
        ContentId::from_digest(&digest, codec)
    }
}

/// Each part as its byte length (u64, big endian) followed by its bytes, so no
/// two part lists share an encoding.
fn frame_parts(parts: &[&str]) -> Vec<u8> {
    let capacity = parts.iter().map(|part| part.len() + 8).sum();
    let mut framed = Vec::with_capacity(capacity);
    for part in parts {
        framed.extend_from_slice(&(part.len() as u64).to_be_bytes());
        framed.extend_from_slice(part.as_bytes());
    }
    framed
}

impl Default for ContentIdentifier {
    fn default() -> Self {
        Self::for_algorithm(HashAlgorithm::default())
    }
}
