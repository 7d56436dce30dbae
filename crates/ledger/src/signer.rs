//! Signing capability.
//!
//! Wallet-style boundary: holders sign authorization entries and transaction
//! envelopes; key material never crosses the trait.

use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;

use protocol::Address;

use crate::auth::AuthorizationEntry;
use crate::tx::{Transaction, TransactionEnvelope};
use crate::types::Sequence;

pub trait Signer: Send + Sync {
    fn address(&self) -> Address;

    /// Set the entry's expiry window and sign its payload. Only the entry
    /// whose credential matches this signer is meaningful to sign; the
    /// ledger rejects mismatches at apply time.
    fn sign_authorization(
        &self,
        entry: AuthorizationEntry,
        expiry_sequence: Sequence,
    ) -> AuthorizationEntry;

    /// Wrap a transaction with the outer fee/sequence signature.
    fn sign_envelope(&self, tx: Transaction) -> TransactionEnvelope;
}

/// In-memory Ed25519 keypair.
pub struct LocalSigner {
    key: SigningKey,
}

impl LocalSigner {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&seed),
        }
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        Address::from_bytes(self.key.verifying_key().to_bytes())
    }

    fn sign_authorization(
        &self,
        mut entry: AuthorizationEntry,
        expiry_sequence: Sequence,
    ) -> AuthorizationEntry {
        entry.expiry_sequence = expiry_sequence;
        entry.signature = Some(self.key.sign(&entry.signing_payload()));
        entry
    }

    fn sign_envelope(&self, tx: Transaction) -> TransactionEnvelope {
        let signature = self.key.sign(&tx.digest());
        TransactionEnvelope {
            tx,
            signature: Some(signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_signers_have_distinct_addresses() {
        assert_ne!(LocalSigner::generate().address(), LocalSigner::generate().address());
    }

    #[test]
    fn seeded_signer_is_deterministic() {
        let a = LocalSigner::from_seed([7; 32]);
        let b = LocalSigner::from_seed([7; 32]);
        assert_eq!(a.address(), b.address());
    }
}
