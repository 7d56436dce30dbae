//! Transactions and envelopes.

use serde::{Deserialize, Serialize};

use ed25519_dalek::{Signature, VerifyingKey};

use protocol::{Address, Commitment, SessionId};

use crate::auth::AuthorizationEntry;
use crate::digest::digest_of;
use crate::error::{LedgerError, Result};
use crate::types::{Arg, Function};

const TX_DOMAIN: &[u8] = b"hunt.tx.v1";

/// One contract call with typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub function: Function,
    pub args: Vec<Arg>,
}

impl Invocation {
    pub fn start_game(
        session_id: SessionId,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
        treasure_hash: Commitment,
    ) -> Self {
        Self {
            function: Function::StartGame,
            args: vec![
                Arg::U32(session_id),
                Arg::Addr(player1),
                Arg::Addr(player2),
                Arg::I128(player1_points),
                Arg::I128(player2_points),
                Arg::Bytes32(*treasure_hash.as_bytes()),
            ],
        }
    }

    /// `public_inputs` travels as an opaque 32-byte value; the gate compares
    /// it byte-for-byte against the stored commitment.
    pub fn submit_zk_proof(
        session_id: SessionId,
        player: Address,
        proof: Vec<u8>,
        public_inputs: [u8; 32],
        energy_used: u32,
    ) -> Self {
        Self {
            function: Function::SubmitZkProof,
            args: vec![
                Arg::U32(session_id),
                Arg::Addr(player),
                Arg::Bytes(proof),
                Arg::Bytes32(public_inputs),
                Arg::U32(energy_used),
            ],
        }
    }

    pub fn resolve_game(session_id: SessionId) -> Self {
        Self {
            function: Function::ResolveGame,
            args: vec![Arg::U32(session_id)],
        }
    }
}

/// A sourced, sequenced invocation plus its authorization set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub source: Address,
    pub sequence: u64,
    pub fee: u64,
    pub invocation: Invocation,
    pub auth: Vec<AuthorizationEntry>,
}

impl Transaction {
    /// Digest the envelope signature covers. Includes the authorization set,
    /// so swapping entries after envelope signing invalidates the envelope.
    pub fn digest(&self) -> [u8; 32] {
        digest_of(TX_DOMAIN, self)
    }
}

/// Transaction wrapped with the source account's outer signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub tx: Transaction,
    pub signature: Option<Signature>,
}

impl TransactionEnvelope {
    /// Validate the outer signature against the source address.
    pub fn verify(&self) -> Result<()> {
        let signature = self.signature.as_ref().ok_or(LedgerError::EnvelopeUnsigned)?;
        let key = VerifyingKey::from_bytes(self.tx.source.as_bytes())
            .map_err(|_| LedgerError::EnvelopeSignatureInvalid)?;
        key.verify_strict(&self.tx.digest(), signature)
            .map_err(|_| LedgerError::EnvelopeSignatureInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{LocalSigner, Signer};
    use crate::types::BASE_FEE;

    fn transaction(source: Address) -> Transaction {
        Transaction {
            source,
            sequence: 1,
            fee: BASE_FEE,
            invocation: Invocation::resolve_game(42),
            auth: Vec::new(),
        }
    }

    #[test]
    fn signed_envelope_verifies() {
        let signer = LocalSigner::generate();
        let envelope = signer.sign_envelope(transaction(signer.address()));
        assert!(envelope.verify().is_ok());
    }

    #[test]
    fn unsigned_envelope_is_rejected() {
        let signer = LocalSigner::generate();
        let envelope = TransactionEnvelope {
            tx: transaction(signer.address()),
            signature: None,
        };
        assert_eq!(envelope.verify().unwrap_err(), LedgerError::EnvelopeUnsigned);
    }

    #[test]
    fn envelope_signature_covers_the_auth_set() {
        let signer = LocalSigner::generate();
        let other = LocalSigner::generate();
        let mut envelope = signer.sign_envelope(transaction(signer.address()));
        envelope.tx.auth.push(AuthorizationEntry::unsigned(
            other.address(),
            Function::ResolveGame,
            vec![Arg::U32(42)],
            0,
        ));
        assert_eq!(
            envelope.verify().unwrap_err(),
            LedgerError::EnvelopeSignatureInvalid
        );
    }

    #[test]
    fn digest_changes_with_the_invocation() {
        let signer = LocalSigner::generate();
        let a = transaction(signer.address());
        let mut b = a.clone();
        b.invocation = Invocation::resolve_game(43);
        assert_ne!(a.digest(), b.digest());
    }
}
