//! Proving backend interface.
//!
//! Backends implement the two-step contract: execute the relation into a
//! witness, then prove the witness under a transcript mode.

use serde::{Deserialize, Serialize};
use tracing::debug;

use protocol::{Commitment, commit};

use crate::inputs::{PrivateInputs, Witness};
use crate::transcript::{TranscriptMode, transcript_digest};

/// ZK proof data container.
///
/// Carries the opaque proof bytes, the public output the verifier checks
/// them against, and the backend that generated them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofData {
    pub bytes: Vec<u8>,
    pub public_output: Commitment,
    pub backend: ProofBackend,
}

/// Identifies which proving backend generated a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofBackend {
    Local,
}

/// Errors surfaced while executing the relation or generating a proof.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("malformed private inputs: {0}")]
    MalformedInputs(String),

    #[error("witness does not open the supplied commitment")]
    RelationUnsatisfied,

    #[error("proving backend failure: {0}")]
    Backend(String),
}

/// Proving backend interface.
pub trait Prover: Send + Sync {
    /// Run the commitment relation over the private inputs, producing a
    /// witness for `public_input`.
    ///
    /// Fails closed when a coordinate is out of range or when the inputs do
    /// not open the supplied commitment; no witness exists in either case.
    fn execute(
        &self,
        inputs: &PrivateInputs,
        public_input: &Commitment,
    ) -> Result<Witness, ProofError>;

    /// Generate a proof for an executed witness under `mode`.
    ///
    /// The embedded public output equals the witness commitment. Proving
    /// under a mode the gate verifier is not keyed for succeeds here;
    /// rejection happens at verification.
    fn prove(&self, witness: &Witness, mode: TranscriptMode) -> Result<ProofData, ProofError>;
}

// ============================================================================
// Local Prover
// ============================================================================

/// In-process proving backend.
///
/// Exercises the full input/output contract of the production proving stack
/// with instant proofs.
///
/// **Warning**: Provides no cryptographic soundness - development and
/// testing only.
#[derive(Debug, Clone, Default)]
pub struct LocalProver;

impl LocalProver {
    pub fn new() -> Self {
        Self
    }
}

impl Prover for LocalProver {
    fn execute(
        &self,
        inputs: &PrivateInputs,
        public_input: &Commitment,
    ) -> Result<Witness, ProofError> {
        let commitment = commit(inputs.x, inputs.y, &inputs.nullifier)
            .map_err(|e| ProofError::MalformedInputs(e.to_string()))?;
        if commitment != *public_input {
            return Err(ProofError::RelationUnsatisfied);
        }
        Ok(Witness {
            x: inputs.x,
            y: inputs.y,
            nullifier: inputs.nullifier,
            commitment,
        })
    }

    fn prove(&self, witness: &Witness, mode: TranscriptMode) -> Result<ProofData, ProofError> {
        // The relation is re-executed from the witness; only the committed
        // public output feeds the transcript.
        let public_output = commit(witness.x, witness.y, &witness.nullifier)
            .map_err(|e| ProofError::Backend(e.to_string()))?;
        let bytes = transcript_digest(mode, &public_output).to_vec();
        debug!(public_output = %public_output, ?mode, "proof generated");
        Ok(ProofData {
            bytes,
            public_output,
            backend: ProofBackend::Local,
        })
    }
}
