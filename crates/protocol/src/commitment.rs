//! Commitment codec binding treasure coordinates to a session.
//!
//! [`commit`] hashes the secret coordinates together with a session-scoped
//! nullifier into the 32-byte value stored on the ledger at creation. The
//! proof system exposes the same value as its public output, so the gate
//! compares byte-for-byte without ever learning the coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{Address, SessionId};

/// Exclusive upper bound for either coordinate. Matches the range check the
/// witness builder enforces, so an out-of-range commitment can never have a
/// satisfiable proof.
pub const COORD_LIMIT: u32 = 1 << 16;

const COMMIT_DOMAIN: &[u8] = b"hunt.commit.v1";
const NULLIFIER_DOMAIN: &[u8] = b"hunt.nullifier.v1";

/// 32-byte commitment to a treasure location.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(self.0))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = hex::encode(self.0);
        write!(f, "{}..{}", &full[..8], &full[full.len() - 4..])
    }
}

/// Session-scoped binding value mixed into every commitment.
///
/// Derivable from public session identity, so both parties compute it
/// independently; it is not a secret.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nullifier([u8; 32]);

impl Nullifier {
    /// Derive the per-session nullifier from the session identity. The same
    /// coordinates commit to unrelated values in different sessions, which
    /// is the sole defense against replaying a proof across sessions.
    pub fn derive(session_id: SessionId, player1: &Address, player2: &Address) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(NULLIFIER_DOMAIN);
        hasher.update(session_id.to_be_bytes());
        hasher.update(player1.as_bytes());
        hasher.update(player2.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Externally supplied binding value, widened into the trailing bytes.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nullifier({})", hex::encode(self.0))
    }
}

/// Commitment codec failures. Out-of-range input fails closed; values are
/// never masked or wrapped to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("coordinates ({x}, {y}) outside the {COORD_LIMIT}x{COORD_LIMIT} board")]
    CoordinateOutOfRange { x: u32, y: u32 },
}

/// Commit to treasure coordinates under a session nullifier.
///
/// Deterministic: identical inputs always produce identical bytes, and any
/// single-input change produces an unrelated digest.
pub fn commit(x: u32, y: u32, nullifier: &Nullifier) -> Result<Commitment, CommitError> {
    if x >= COORD_LIMIT || y >= COORD_LIMIT {
        return Err(CommitError::CoordinateOutOfRange { x, y });
    }
    let mut hasher = Sha256::new();
    hasher.update(COMMIT_DOMAIN);
    hasher.update(x.to_be_bytes());
    hasher.update(y.to_be_bytes());
    hasher.update(nullifier.as_bytes());
    Ok(Commitment(hasher.finalize().into()))
}
