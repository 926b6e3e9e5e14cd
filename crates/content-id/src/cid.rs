use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base32;
use crate::errors::{IdentifierError, IdentifierResult};
use crate::identifier::Digest;
use crate::primitive::HashAlgorithm;

pub const CID_VERSION: u8 = 0x01;
/// Multibase marker for lowercase base32.
pub const MULTIBASE_BASE32: char = 'b';
const PREFIX_LEN: usize = 3;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Codec {
    #[default]
    Raw,
    DagPb,
    DagCbor,
}

impl Codec {
    pub fn code(&self) -> u8 {
        match self {
            Codec::Raw => 0x55,
            Codec::DagPb => 0x70,
            Codec::DagCbor => 0x71,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x55 => Some(Codec::Raw),
            0x70 => Some(Codec::DagPb),
            0x71 => Some(Codec::DagCbor),
            _ => None,
        }
    }
}

impl FromStr for Codec {
    type Err = IdentifierError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Codec::Raw),
            "dag-pb" | "dagpb" => Ok(Codec::DagPb),
            "dag-cbor" | "dagcbor" => Ok(Codec::DagCbor),
            other => Err(IdentifierError::InvalidCid(format!("unknown codec '{other}'"))),
        }
    }
}

/// Formatted identifier only; nothing here resolves it against a network.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn from_digest(digest: &Digest, codec: Codec) -> Self {
        let mut bytes = Vec::with_capacity(PREFIX_LEN + digest.bytes().len());
        bytes.push(CID_VERSION);
        bytes.push(codec.code());
        bytes.push(digest.algorithm().code());
        bytes.extend_from_slice(digest.bytes());
        Self(format!("{MULTIBASE_BASE32}{}", base32::encode(&bytes)))
    }

    pub fn parse(raw: &str) -> IdentifierResult<Self> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix(MULTIBASE_BASE32)
            .ok_or_else(|| IdentifierError::InvalidCid("missing multibase prefix".into()))?;
        let bytes = base32::decode(body)
            .ok_or_else(|| IdentifierError::InvalidCid("not base32".into()))?;
        if bytes.len() <= PREFIX_LEN {
            return Err(IdentifierError::InvalidCid("truncated".into()));
        }
        if bytes[0] != CID_VERSION {
            return Err(IdentifierError::InvalidCid(format!(
                "unsupported version {}",
                bytes[0]
            )));
        }
        if Codec::from_code(bytes[1]).is_none() || HashAlgorithm::from_code(bytes[2]).is_none() {
            return Err(IdentifierError::InvalidCid("unknown codec or hash code".into()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn decoded(&self) -> Vec<u8> {
        self.0
            .strip_prefix(MULTIBASE_BASE32)
            .and_then(base32::decode)
            .unwrap_or_default()
    }

    pub fn codec(&self) -> Option<Codec> {
        self.decoded().get(1).copied().and_then(Codec::from_code)
    }

    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        self.decoded().get(2).copied().and_then(HashAlgorithm::from_code)
    }

    pub fn digest_hex(&self) -> String {
        let decoded = self.decoded();
        hex::encode(decoded.get(PREFIX_LEN..).unwrap_or_default())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn to_uri(cid: &ContentId) -> String {
    format!("ipfs://{cid}")
}

pub fn to_gateway_url(cid: &ContentId, host: &str) -> IdentifierResult<String> {
    let host = host
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    if host.is_empty() {
        return Err(IdentifierError::MissingHost);
    }
    Ok(format!("https://{host}/{cid}"))
}
