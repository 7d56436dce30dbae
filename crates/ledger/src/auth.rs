//! Credential-scoped, time-bounded authorization entries.
//!
//! An entry is a detached signature over one specific invocation scope. It
//! lives outside the session record, carries its own validity window and a
//! replay nonce, and is the unit the two-phase session assembly passes
//! between parties: simulation records unsigned entries, each party signs
//! only its own, and apply enforces the full set.

use serde::{Deserialize, Serialize};

use ed25519_dalek::{Signature, VerifyingKey};

use protocol::Address;

use crate::digest::digest_of;
use crate::types::{Arg, Function, Sequence};

const SCOPE_DOMAIN: &[u8] = b"hunt.auth.scope.v1";
const PAYLOAD_DOMAIN: &[u8] = b"hunt.auth.payload.v1";

/// One credential's authorization for one invocation scope.
///
/// `function` and `args` describe exactly what the credential consents to;
/// the signature additionally covers `nonce` and `expiry_sequence`, so a
/// signed entry cannot be stretched to a different window or replayed once
/// its nonce is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationEntry {
    pub credential: Address,
    pub function: Function,
    pub args: Vec<Arg>,
    pub nonce: u64,
    pub expiry_sequence: Sequence,
    pub signature: Option<Signature>,
}

impl AuthorizationEntry {
    /// Fresh unsigned entry, as simulation records it. Expiry stays zero
    /// until the credential holder signs.
    pub fn unsigned(credential: Address, function: Function, args: Vec<Arg>, nonce: u64) -> Self {
        Self {
            credential,
            function,
            args,
            nonce,
            expiry_sequence: 0,
            signature: None,
        }
    }

    /// Fingerprint of an invocation scope.
    pub fn scope_fingerprint_of(function: Function, args: &[Arg]) -> [u8; 32] {
        digest_of(SCOPE_DOMAIN, &(function, args))
    }

    /// Fingerprint of this entry's scope. Deliberately excludes nonce,
    /// expiry and signature: two simulations of the same invocation agree
    /// on it even though they assign different nonces.
    pub fn scope_fingerprint(&self) -> [u8; 32] {
        Self::scope_fingerprint_of(self.function, &self.args)
    }

    /// Whether `other` covers the same credential and scope, regardless of
    /// nonce, expiry or signature state.
    pub fn matches_scope(&self, other: &AuthorizationEntry) -> bool {
        self.credential == other.credential && self.scope_fingerprint() == other.scope_fingerprint()
    }

    /// Digest the signature covers: credential, scope, nonce and expiry.
    pub fn signing_payload(&self) -> [u8; 32] {
        digest_of(
            PAYLOAD_DOMAIN,
            &(
                &self.credential,
                self.scope_fingerprint(),
                self.nonce,
                self.expiry_sequence,
            ),
        )
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Check the signature against the credential read as a verifying key.
    /// Unsigned entries and credentials that are not valid keys fail.
    pub fn verify_signature(&self) -> bool {
        let Some(signature) = &self.signature else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(self.credential.as_bytes()) else {
            return false;
        };
        key.verify_strict(&self.signing_payload(), signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{LocalSigner, Signer};

    fn entry_for(signer: &LocalSigner, args: Vec<Arg>, nonce: u64) -> AuthorizationEntry {
        AuthorizationEntry::unsigned(signer.address(), Function::StartGame, args, nonce)
    }

    #[test]
    fn scope_fingerprint_ignores_nonce_expiry_and_signature() {
        let signer = LocalSigner::generate();
        let args = vec![Arg::U32(42), Arg::I128(100)];
        let a = entry_for(&signer, args.clone(), 1);
        let b = signer.sign_authorization(entry_for(&signer, args, 2), 900);
        assert!(a.matches_scope(&b));
        assert_eq!(a.scope_fingerprint(), b.scope_fingerprint());
    }

    #[test]
    fn scope_fingerprint_tracks_argument_values() {
        let signer = LocalSigner::generate();
        let a = entry_for(&signer, vec![Arg::U32(42), Arg::I128(100)], 1);
        let b = entry_for(&signer, vec![Arg::U32(42), Arg::I128(101)], 1);
        assert!(!a.matches_scope(&b));
    }

    #[test]
    fn signed_entry_verifies_and_rejects_tampering() {
        let signer = LocalSigner::generate();
        let signed = signer.sign_authorization(entry_for(&signer, vec![Arg::U32(7)], 3), 500);
        assert!(signed.verify_signature());

        let mut stretched = signed.clone();
        stretched.expiry_sequence += 1;
        assert!(!stretched.verify_signature());

        let mut rescoped = signed.clone();
        rescoped.args = vec![Arg::U32(8)];
        assert!(!rescoped.verify_signature());

        let mut renumbered = signed;
        renumbered.nonce += 1;
        assert!(!renumbered.verify_signature());
    }

    #[test]
    fn unsigned_entry_never_verifies() {
        let signer = LocalSigner::generate();
        assert!(!entry_for(&signer, vec![Arg::U32(7)], 0).verify_signature());
    }

    #[test]
    fn signature_is_bound_to_the_credential() {
        let signer = LocalSigner::generate();
        let other = LocalSigner::generate();
        let mut signed = signer.sign_authorization(entry_for(&signer, vec![Arg::U32(7)], 3), 500);
        signed.credential = other.address();
        assert!(!signed.verify_signature());
    }
}
