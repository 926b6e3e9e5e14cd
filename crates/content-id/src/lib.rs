//! Content-addressed identifiers.
//!
//! Payloads are hashed with a host-supplied primitive (SHA-256 unless told
//! otherwise) and formatted as CIDv1-style base32 strings. Formatting only:
//! identifiers are never resolved against a content network here.
//!
//! When the primitive is unavailable the identifier degrades to a fast FNV-1a
//! digest. Those digests are flagged `reduced_strength`; treat their collision
//! resistance as best effort.

pub mod base32;
pub mod cid;
pub mod errors;
pub mod fingerprint;
pub mod identifier;
pub mod primitive;

pub use cid::{to_gateway_url, to_uri, Codec, ContentId};
pub use errors::{IdentifierError, IdentifierResult};
pub use fingerprint::hash_bytes;
pub use identifier::{ContentIdentifier, Digest};
pub use primitive::{
    primitive_for, Blake3Primitive, FallbackPrimitive, HashAlgorithm, HashPrimitive,
    Sha256Primitive,
};
