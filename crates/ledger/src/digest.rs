//! Deterministic digests over serialized values.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Domain-separated SHA-256 over the bincode encoding of `value`.
///
/// bincode serialization of these in-memory types is deterministic and
/// consistent across calls, which is what makes scope fingerprints and
/// signing payloads comparable between parties.
pub(crate) fn digest_of<T: Serialize>(domain: &[u8], value: &T) -> [u8; 32] {
    let bytes = bincode::serialize(value).expect("value serialization should not fail");
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(&bytes);
    hasher.finalize().into()
}
