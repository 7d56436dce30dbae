//! Zero-knowledge proof boundary for the treasure-hunt protocol.
//!
//! The proof system is consumed as a black box with a fixed contract:
//!
//! - [`Prover::execute`] runs the commitment relation over the private
//!   inputs and produces a [`Witness`], failing closed on malformed or
//!   unsatisfiable inputs.
//! - [`Prover::prove`] turns a witness into [`ProofData`] whose public
//!   output is exactly the committed value.
//! - [`ProofVerifier::verify`] is the gate-side check the ledger contract
//!   calls with the proof bytes and the stored commitment.
//!
//! Prover and verifier must agree on the transcript keying; the pinned
//! [`TRANSCRIPT_MODE`] constant is the single source of truth for both
//! sides. Private inputs never cross back out of this crate except as the
//! public output embedded in a successful proof.

pub mod inputs;
pub mod prover;
pub mod transcript;
pub mod verifier;

pub use inputs::{PrivateInputs, Witness};
pub use prover::{LocalProver, ProofBackend, ProofData, ProofError, Prover};
pub use transcript::{TRANSCRIPT_MODE, TranscriptMode};
pub use verifier::{ProofVerifier, TranscriptVerifier};
