//! Gate-side proof verification.

use tracing::trace;

use protocol::Commitment;

use crate::transcript::{TRANSCRIPT_MODE, TranscriptMode, transcript_digest};

/// Verifier interface the ledger contract calls through.
pub trait ProofVerifier: Send + Sync {
    /// Check proof bytes against the public input. Purely boolean; the gate
    /// maps `false` onto its own failure handling.
    fn verify(&self, proof: &[u8], public_input: &Commitment) -> bool;
}

/// Recomputes the transcript under its configured keying and compares.
#[derive(Debug, Clone)]
pub struct TranscriptVerifier {
    mode: TranscriptMode,
}

impl TranscriptVerifier {
    /// Verifier keyed the way the deployed gate is.
    pub fn new() -> Self {
        Self {
            mode: TRANSCRIPT_MODE,
        }
    }

    /// Verifier with an explicit keying, for exercising mode drift.
    pub fn with_mode(mode: TranscriptMode) -> Self {
        Self { mode }
    }
}

impl Default for TranscriptVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ProofVerifier for TranscriptVerifier {
    fn verify(&self, proof: &[u8], public_input: &Commitment) -> bool {
        let accepted = proof == transcript_digest(self.mode, public_input).as_slice();
        trace!(public_input = %public_input, accepted, "proof checked");
        accepted
    }
}
