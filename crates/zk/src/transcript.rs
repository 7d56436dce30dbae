//! Proof transcript construction.
//!
//! The proving backend and the gate verifier must agree on how the
//! transcript challenges are keyed. A mismatched mode still yields
//! syntactically valid proof bytes and no error at proving time; the gate
//! simply rejects the proof. The deployed configuration therefore lives
//! here as one pinned constant, exercised by tests on both sides of the
//! boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use protocol::Commitment;

/// How the proof transcript binds its challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptMode {
    /// Challenges keyed with the protocol domain key. The deployed gate
    /// verifier expects this mode.
    Keyed,
    /// Unkeyed transcript. Kept so tests can demonstrate that mode drift
    /// produces well-formed proofs the gate rejects.
    Plain,
}

/// Transcript mode the deployed verifier is keyed for.
pub const TRANSCRIPT_MODE: TranscriptMode = TranscriptMode::Keyed;

const TRANSCRIPT_KEY: &[u8] = b"hunt.transcript.v1";

/// Digest of the proof transcript over the public output.
pub(crate) fn transcript_digest(mode: TranscriptMode, public_output: &Commitment) -> [u8; 32] {
    let mut hasher = Sha256::new();
    match mode {
        TranscriptMode::Keyed => {
            hasher.update(TRANSCRIPT_KEY);
            hasher.update([0x01]);
        }
        TranscriptMode::Plain => {
            hasher.update([0x00]);
        }
    }
    hasher.update(public_output.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployed_mode_is_keyed() {
        assert_eq!(TRANSCRIPT_MODE, TranscriptMode::Keyed);
    }

    #[test]
    fn modes_produce_unrelated_digests() {
        let output = Commitment::from_bytes([7; 32]);
        assert_ne!(
            transcript_digest(TranscriptMode::Keyed, &output),
            transcript_digest(TranscriptMode::Plain, &output)
        );
    }
}
