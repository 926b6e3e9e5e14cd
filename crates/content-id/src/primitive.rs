//! Hash primitives a host can plug into the identifier.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::errors::{IdentifierError, IdentifierResult};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
    /// FNV-1a based, not collision resistant.
    Fallback,
}

impl HashAlgorithm {
    /// Single-byte algorithm code written into the CID prefix.
    pub fn code(&self) -> u8 {
        match self {
            HashAlgorithm::Sha256 => 0x12,
            HashAlgorithm::Blake3 => 0x1e,
            HashAlgorithm::Fallback => 0x00,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x12 => Some(HashAlgorithm::Sha256),
            0x1e => Some(HashAlgorithm::Blake3),
            0x00 => Some(HashAlgorithm::Fallback),
            _ => None,
        }
    }

    pub fn is_cryptographic(&self) -> bool {
        !matches!(self, HashAlgorithm::Fallback)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Fallback => "fallback",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = IdentifierError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            "fallback" | "fnv" => Ok(HashAlgorithm::Fallback),
            other => Err(IdentifierError::PrimitiveUnavailable(format!(
                "unknown hash algorithm '{other}'"
            ))),
        }
    }
}

/// Host-supplied digest function. Implementations may suspend.
#[async_trait]
pub trait HashPrimitive: Send + Sync {
    fn algorithm(&self) -> HashAlgorithm;

    async fn digest(&self, payload: &[u8]) -> IdentifierResult<Vec<u8>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Primitive;

#[async_trait]
impl HashPrimitive for Sha256Primitive {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }

    async fn digest(&self, payload: &[u8]) -> IdentifierResult<Vec<u8>> {
        Ok(Sha256::digest(payload).to_vec())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Primitive;

#[async_trait]
impl HashPrimitive for Blake3Primitive {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Blake3
    }

    async fn digest(&self, payload: &[u8]) -> IdentifierResult<Vec<u8>> {
        Ok(blake3::hash(payload).as_bytes().to_vec())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackPrimitive;

#[async_trait]
impl HashPrimitive for FallbackPrimitive {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Fallback
    }

    async fn digest(&self, payload: &[u8]) -> IdentifierResult<Vec<u8>> {
        Ok(fallback_digest(payload).to_vec())
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const LANE_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Four seeded FNV-1a lanes with a final avalanche, 32 bytes out so the
/// digest has the same width as the cryptographic primitives.
pub fn fallback_digest(payload: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for lane in 0..4u64 {
        let mut state = FNV_OFFSET ^ LANE_SEED.wrapping_mul(lane + 1);
        for &byte in payload {
            state ^= u64::from(byte);
            state = state.wrapping_mul(FNV_PRIME);
        }
        state ^= payload.len() as u64;
        state ^= state >> 33;
        state = state.wrapping_mul(0xff51_afd7_ed55_8ccd);
        state ^= state >> 33;
        let start = (lane as usize) * 8;
        out[start..start + 8].copy_from_slice(&state.to_be_bytes());
    }
    out
}

pub fn primitive_for(algorithm: HashAlgorithm) -> Arc<dyn HashPrimitive> {
    match algorithm {
        HashAlgorithm::Sha256 => Arc::new(Sha256Primitive),
        HashAlgorithm::Blake3 => Arc::new(Blake3Primitive),
        HashAlgorithm::Fallback => Arc::new(FallbackPrimitive),
    }
}
