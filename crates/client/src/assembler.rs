//! Session authorization assembler.
//!
//! Three-step protocol that turns two independently-signed halves into one
//! jointly-authorized session-creation transaction:
//!
//! - **Step A** ([`prepare_session`], initiator): simulate the creation
//!   invocation against a placeholder counterparty, sign only the
//!   initiator's recorded authorization entry, and pack it into a
//!   [`SessionOffer`] for out-of-band transfer.
//! - **Step B** ([`co_sign_session`], responder): validate the offer,
//!   rebuild the invocation with both real parties, simulate for a fresh
//!   unsigned entry set, splice the initiator's signed entry over its stub,
//!   and sign the responder's own stub.
//! - **Step C** ([`finalize_session`], responder): sign the outer envelope
//!   and broadcast.
//!
//! Once Step B completes, the authorization set lives in an immutable
//! [`SignedAuthorizations`] value. Any later simulation pass must go
//! through [`SignedAuthorizations::splice_into`]; rebuilding the set from a
//! fresh simulation would silently discard both signatures and the
//! broadcast would fail authorization.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ledger::{
    Arg, AuthorizationEntry, BASE_FEE, Function, Invocation, Ledger, LedgerError, Sequence,
    Signer, Transaction, TxReceipt,
};
use protocol::{Address, Commitment, SessionId};

/// Offer artifact version understood by this client.
pub const OFFER_VERSION: u16 = 1;

/// Stake attributed to the placeholder counterparty in Step A.
///
/// Deliberately zero: the simulation checks that the placeholder account
/// exists, not its funding depth, and a zero stake keeps Step A independent
/// of the placeholder's balance. The initiator's own entry scopes
/// `(session_id, initiator_stake)` either way.
const PLACEHOLDER_STAKE: i128 = 0;

/// Assembly failures. All are detected locally, before any state-changing
/// ledger call; a failed step leaves nothing behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    #[error("initiator and responder are the same identity")]
    SelfPlay,

    #[error("placeholder account is one of the session parties")]
    PlaceholderIsParty,

    #[error("offer authorization expired at sequence {expiry}, current is {current}")]
    OfferExpired { expiry: Sequence, current: Sequence },

    #[error("offer serialization failed: {0}")]
    EncodeFailed(String),

    #[error("malformed session offer: {0}")]
    MalformedOffer(String),

    #[error("unsupported offer version {0}")]
    UnsupportedOfferVersion(u16),

    #[error("offer signature does not verify against the initiator")]
    InvalidOfferSignature,

    #[error("simulation recorded no authorization entry for the initiator")]
    InitiatorEntryMissing,

    #[error("simulation recorded no authorization entry for the responder")]
    ResponderEntryMissing,

    #[error("no stub in the fresh authorization set matches the signed entry for {credential}")]
    SpliceMismatch { credential: Address },

    #[error("authorization entry for {credential} is unsigned")]
    UnsignedEntry { credential: Address },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ============================================================================
// Session Offer (Step A artifact)
// ============================================================================

/// Serialized output of Step A, transferred to the responder out of band
/// (copy/paste or URL).
///
/// Self-describing: the responder rebuilds the full invocation from the
/// plaintext parameters and checks the detached signature against the
/// embedded initiator address, trusting nothing else. The treasure hash is
/// deliberately absent; the responder recomputes it independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOffer {
    pub version: u16,
    pub session_id: SessionId,
    pub initiator: Address,
    pub initiator_stake: i128,
    /// The initiator's signed authorization entry, spliced verbatim into
    /// the responder's fresh simulation in Step B.
    pub entry: AuthorizationEntry,
}

impl SessionOffer {
    /// Hex text form for out-of-band transfer.
    pub fn encode(&self) -> Result<String, AssembleError> {
        let bytes =
            bincode::serialize(self).map_err(|e| AssembleError::EncodeFailed(e.to_string()))?;
        Ok(hex::encode(bytes))
    }

    pub fn decode(text: &str) -> Result<Self, AssembleError> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| AssembleError::MalformedOffer(e.to_string()))?;
        let offer: SessionOffer = bincode::deserialize(&bytes)
            .map_err(|e| AssembleError::MalformedOffer(e.to_string()))?;
        if offer.version != OFFER_VERSION {
            return Err(AssembleError::UnsupportedOfferVersion(offer.version));
        }
        Ok(offer)
    }

    /// Check internal consistency, the detached signature, and the expiry
    /// window against the current ledger height.
    pub fn validate(&self, current_sequence: Sequence) -> Result<(), AssembleError> {
        let scope = vec![Arg::U32(self.session_id), Arg::I128(self.initiator_stake)];
        if self.entry.credential != self.initiator
            || self.entry.function != Function::StartGame
            || self.entry.args != scope
        {
            return Err(AssembleError::MalformedOffer(
                "authorization entry does not match the offer parameters".into(),
            ));
        }
        if !self.entry.verify_signature() {
            return Err(AssembleError::InvalidOfferSignature);
        }
        if self.entry.expiry_sequence < current_sequence {
            return Err(AssembleError::OfferExpired {
                expiry: self.entry.expiry_sequence,
                current: current_sequence,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Signed authorization set
// ============================================================================

/// The spliced, fully-signed authorization set produced by Step B.
///
/// Immutable once built: every later step reads from it and nothing
/// recomputes it. A simulation pass run after Step B for any reason must
/// re-inject these entries via [`splice_into`](Self::splice_into) before
/// signing or broadcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthorizations {
    entries: Vec<AuthorizationEntry>,
}

impl SignedAuthorizations {
    /// Wrap a fully-signed set. Rejects any unsigned entry so a half-built
    /// set can never reach the broadcast path.
    pub fn new(entries: Vec<AuthorizationEntry>) -> Result<Self, AssembleError> {
        if let Some(unsigned) = entries.iter().find(|e| !e.is_signed()) {
            return Err(AssembleError::UnsignedEntry {
                credential: unsigned.credential,
            });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[AuthorizationEntry] {
        &self.entries
    }

    /// Re-inject the stored signed entries into a freshly simulated set,
    /// replacing the unsigned stubs that match by credential and scope.
    ///
    /// This is the only sanctioned way to touch an in-flight authorization
    /// set after Step B.
    pub fn splice_into(
        &self,
        fresh: Vec<AuthorizationEntry>,
    ) -> Result<Vec<AuthorizationEntry>, AssembleError> {
        let mut spliced = fresh;
        for signed in &self.entries {
            let stub = spliced
                .iter_mut()
                .find(|stub| stub.matches_scope(signed))
                .ok_or(AssembleError::SpliceMismatch {
                    credential: signed.credential,
                })?;
            *stub = signed.clone();
        }
        Ok(spliced)
    }
}

/// Output of Step B: the full creation invocation plus the immutable
/// signed authorization set, ready for envelope signing.
#[derive(Debug, Clone)]
pub struct CoSignedSession {
    pub session_id: SessionId,
    pub invocation: Invocation,
    pub authorizations: SignedAuthorizations,
}

// ============================================================================
// Protocol steps
// ============================================================================

/// Inputs to Step A.
#[derive(Debug, Clone)]
pub struct PrepareParams {
    pub session_id: SessionId,
    pub initiator_stake: i128,
    /// Real identity distinct from both parties. Present only so the
    /// Step-A simulation clears its account-existence check; it is staked
    /// [`PLACEHOLDER_STAKE`] (zero), so its balance never matters.
    pub placeholder: Address,
    pub auth_ttl: Sequence,
    pub treasure_hash: Commitment,
}

/// Step A: simulate against the placeholder, sign only the initiator's
/// recorded entry, bounded by `auth_ttl` ledgers from now.
pub async fn prepare_session(
    ledger: &dyn Ledger,
    signer: &dyn Signer,
    params: &PrepareParams,
) -> Result<SessionOffer, AssembleError> {
    let initiator = signer.address();
    if params.placeholder == initiator {
        return Err(AssembleError::PlaceholderIsParty);
    }

    let invocation = Invocation::start_game(
        params.session_id,
        initiator,
        params.placeholder,
        params.initiator_stake,
        PLACEHOLDER_STAKE,
        params.treasure_hash,
    );
    let account = ledger.account(&initiator).await?;
    let tx = Transaction {
        source: initiator,
        sequence: account.sequence + 1,
        fee: BASE_FEE,
        invocation,
        auth: Vec::new(),
    };
    let sim = ledger.simulate(&tx).await?;
    let entry = sim
        .required_auth
        .into_iter()
        .find(|entry| entry.credential == initiator)
        .ok_or(AssembleError::InitiatorEntryMissing)?;

    let expiry = ledger.current_sequence().await? + params.auth_ttl;
    let signed = signer.sign_authorization(entry, expiry);
    info!(
        session_id = params.session_id,
        %initiator,
        expiry,
        "session offer prepared"
    );
    Ok(SessionOffer {
        version: OFFER_VERSION,
        session_id: params.session_id,
        initiator,
        initiator_stake: params.initiator_stake,
        entry: signed,
    })
}

/// Step B: validate the offer, rebuild the invocation with both real
/// parties and the recomputed commitment, simulate for a fresh unsigned
/// set, splice the initiator's signed entry in verbatim, and sign the
/// responder's own stub.
pub async fn co_sign_session(
    ledger: &dyn Ledger,
    signer: &dyn Signer,
    offer: &SessionOffer,
    responder_stake: i128,
    treasure_hash: Commitment,
    auth_ttl: Sequence,
) -> Result<CoSignedSession, AssembleError> {
    let responder = signer.address();
    if responder == offer.initiator {
        return Err(AssembleError::SelfPlay);
    }
    let current = ledger.current_sequence().await?;
    offer.validate(current)?;

    let invocation = Invocation::start_game(
        offer.session_id,
        offer.initiator,
        responder,
        offer.initiator_stake,
        responder_stake,
        treasure_hash,
    );
    let account = ledger.account(&responder).await?;
    let tx = Transaction {
        source: responder,
        sequence: account.sequence + 1,
        fee: BASE_FEE,
        invocation: invocation.clone(),
        auth: Vec::new(),
    };
    // Fresh, unsigned set. Simulating independently of Step A is what makes
    // the splice necessary: the two passes agree on scopes, not on entries.
    let sim = ledger.simulate(&tx).await?;
    let mut entries = sim.required_auth;

    let stub = entries
        .iter_mut()
        .find(|stub| stub.matches_scope(&offer.entry))
        .ok_or(AssembleError::SpliceMismatch {
            credential: offer.initiator,
        })?;
    *stub = offer.entry.clone();
    debug!(session_id = offer.session_id, "initiator entry spliced");

    let expiry = current + auth_ttl;
    let own = entries
        .iter_mut()
        .find(|entry| entry.credential == responder && !entry.is_signed())
        .ok_or(AssembleError::ResponderEntryMissing)?;
    *own = signer.sign_authorization(own.clone(), expiry);

    let authorizations = SignedAuthorizations::new(entries)?;
    info!(session_id = offer.session_id, %responder, "session co-signed");
    Ok(CoSignedSession {
        session_id: offer.session_id,
        invocation,
        authorizations,
    })
}

/// Step C: wrap the invocation and the immutable signed set in an envelope
/// signed by the responder (fee and sequence authority) and broadcast.
/// Atomic on the ledger side; a rejected broadcast creates no session.
pub async fn finalize_session(
    ledger: &dyn Ledger,
    signer: &dyn Signer,
    session: &CoSignedSession,
) -> Result<TxReceipt, AssembleError> {
    let source = signer.address();
    let account = ledger.account(&source).await?;
    let tx = Transaction {
        source,
        sequence: account.sequence + 1,
        fee: BASE_FEE,
        invocation: session.invocation.clone(),
        // Threaded through from Step B untouched; no simulation happens
        // between co-signing and broadcast.
        auth: session.authorizations.entries().to_vec(),
    };
    let receipt = ledger.submit(signer.sign_envelope(tx)).await?;
    info!(
        session_id = session.session_id,
        height = receipt.height,
        "session broadcast"
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger::{LocalSigner, Signer};

    fn offer_from(signer: &LocalSigner) -> SessionOffer {
        let entry = AuthorizationEntry::unsigned(
            signer.address(),
            Function::StartGame,
            vec![Arg::U32(42), Arg::I128(100)],
            7,
        );
        SessionOffer {
            version: OFFER_VERSION,
            session_id: 42,
            initiator: signer.address(),
            initiator_stake: 100,
            entry: signer.sign_authorization(entry, 500),
        }
    }

    #[test]
    fn offer_round_trips_through_text() {
        let signer = LocalSigner::generate();
        let offer = offer_from(&signer);
        let decoded = SessionOffer::decode(&offer.encode().unwrap()).unwrap();
        assert_eq!(decoded, offer);
        assert!(decoded.validate(10).is_ok());
    }

    #[test]
    fn tampered_text_is_malformed() {
        let signer = LocalSigner::generate();
        let mut text = offer_from(&signer).encode().unwrap();
        text.truncate(text.len() - 6);
        assert!(matches!(
            SessionOffer::decode(&text),
            Err(AssembleError::MalformedOffer(_))
        ));
        assert!(matches!(
            SessionOffer::decode("not hex at all"),
            Err(AssembleError::MalformedOffer(_))
        ));
    }

    #[test]
    fn version_drift_is_rejected() {
        let signer = LocalSigner::generate();
        let mut offer = offer_from(&signer);
        offer.version = 2;
        assert_eq!(
            SessionOffer::decode(&offer.encode().unwrap()),
            Err(AssembleError::UnsupportedOfferVersion(2))
        );
    }

    #[test]
    fn validate_checks_consistency_signature_and_expiry() {
        let signer = LocalSigner::generate();
        let offer = offer_from(&signer);

        let mut restaked = offer.clone();
        restaked.initiator_stake = 999;
        assert!(matches!(
            restaked.validate(10),
            Err(AssembleError::MalformedOffer(_))
        ));

        let mut reassigned = offer.clone();
        reassigned.initiator = LocalSigner::generate().address();
        assert!(matches!(
            reassigned.validate(10),
            Err(AssembleError::MalformedOffer(_))
        ));

        let mut stretched = offer.clone();
        stretched.entry.expiry_sequence = 900;
        assert_eq!(
            stretched.validate(10),
            Err(AssembleError::InvalidOfferSignature)
        );

        assert_eq!(
            offer.validate(501),
            Err(AssembleError::OfferExpired {
                expiry: 500,
                current: 501,
            })
        );
        assert!(offer.validate(500).is_ok());
    }

    #[test]
    fn signed_set_rejects_unsigned_entries() {
        let signer = LocalSigner::generate();
        let unsigned = AuthorizationEntry::unsigned(
            signer.address(),
            Function::ResolveGame,
            vec![Arg::U32(42)],
            1,
        );
        assert_eq!(
            SignedAuthorizations::new(vec![unsigned]).unwrap_err(),
            AssembleError::UnsignedEntry {
                credential: signer.address(),
            }
        );
    }

    #[test]
    fn splice_replaces_matching_stubs_verbatim() {
        let alice = LocalSigner::generate();
        let bob = LocalSigner::generate();
        let scope = |who: &LocalSigner, stake: i128| {
            AuthorizationEntry::unsigned(
                who.address(),
                Function::StartGame,
                vec![Arg::U32(42), Arg::I128(stake)],
                0,
            )
        };

        let signed = SignedAuthorizations::new(vec![
            alice.sign_authorization(scope(&alice, 100), 500),
            bob.sign_authorization(scope(&bob, 250), 500),
        ])
        .unwrap();

        // Fresh simulation assigns different nonces; the scope still matches.
        let mut fresh_alice = scope(&alice, 100);
        fresh_alice.nonce = 11;
        let mut fresh_bob = scope(&bob, 250);
        fresh_bob.nonce = 12;

        let spliced = signed.splice_into(vec![fresh_alice, fresh_bob]).unwrap();
        assert_eq!(spliced, signed.entries().to_vec());
        assert!(spliced.iter().all(AuthorizationEntry::is_signed));
    }

    #[test]
    fn splice_fails_when_the_scope_drifted() {
        let alice = LocalSigner::generate();
        let signed_entry = alice.sign_authorization(
            AuthorizationEntry::unsigned(
                alice.address(),
                Function::StartGame,
                vec![Arg::U32(42), Arg::I128(100)],
                0,
            ),
            500,
        );
        let signed = SignedAuthorizations::new(vec![signed_entry]).unwrap();

        // Same credential, different stake: no stub matches.
        let drifted = AuthorizationEntry::unsigned(
            alice.address(),
            Function::StartGame,
            vec![Arg::U32(42), Arg::I128(101)],
            1,
        );
        assert_eq!(
            signed.splice_into(vec![drifted]).unwrap_err(),
            AssembleError::SpliceMismatch {
                credential: alice.address(),
            }
        );
    }
}
