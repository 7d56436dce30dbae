//! Client facade driving the session protocol end to end.

use std::sync::Arc;

use ledger::{BASE_FEE, Invocation, Ledger, LedgerError, Signer, Transaction, TxReceipt};
use protocol::{
    Address, CommitError, Commitment, Game, Nullifier, Outcome, SessionId, commit,
};
use zk::{PrivateInputs, Prover};

use crate::assembler::{self, AssembleError, PrepareParams, SessionOffer};
use crate::builder::HuntClientBuilder;
use crate::config::HuntConfig;
use crate::store::{BoardKey, BoardSnapshot, BoardStore, StoreError};
use crate::sync::{self, SyncError};
use crate::worker::{ProofMetrics, WorkerError, spawn_prover};

/// Everything a client operation can fail with, by layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Proof(#[from] WorkerError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no placeholder account configured; set HUNT_PLACEHOLDER")]
    PlaceholderUnset,

    #[error("transaction returned no outcome")]
    MissingOutcome,
}

/// One party's view of the protocol: a signing identity, a ledger
/// connection, a proving backend and a board store, assembled via
/// [`HuntClient::builder`].
pub struct HuntClient {
    pub(crate) ledger: Arc<dyn Ledger>,
    pub(crate) signer: Arc<dyn Signer>,
    pub(crate) prover: Arc<dyn Prover>,
    pub(crate) store: Arc<dyn BoardStore>,
    pub(crate) config: HuntConfig,
    pub(crate) metrics: Arc<ProofMetrics>,
}

impl std::fmt::Debug for HuntClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuntClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HuntClient {
    pub fn builder() -> HuntClientBuilder {
        HuntClientBuilder::new()
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn metrics(&self) -> Arc<ProofMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Step A, as the initiator: commit to the treasure location and
    /// produce the signed offer artifact to hand to the counterparty.
    ///
    /// The commitment here binds the placeholder identity and exists only
    /// so simulation passes; the responder recomputes the real one with
    /// both parties in [`join_session`](Self::join_session).
    pub async fn open_session(
        &self,
        session_id: SessionId,
        stake: i128,
        x: u32,
        y: u32,
    ) -> Result<SessionOffer, ClientError> {
        let placeholder = self
            .config
            .placeholder
            .ok_or(ClientError::PlaceholderUnset)?;
        let nullifier = Nullifier::derive(session_id, &self.address(), &placeholder);
        let treasure_hash = commit(x, y, &nullifier)?;
        let params = PrepareParams {
            session_id,
            initiator_stake: stake,
            placeholder,
            auth_ttl: self.config.auth_ttl,
            treasure_hash,
        };
        let offer =
            assembler::prepare_session(self.ledger.as_ref(), self.signer.as_ref(), &params)
                .await?;
        Ok(offer)
    }

    /// Steps B and C, as the responder: co-sign the imported offer under
    /// the independently recomputed commitment, then finalize and
    /// broadcast. The session becomes observable atomically or not at all.
    pub async fn join_session(
        &self,
        offer: &SessionOffer,
        stake: i128,
        x: u32,
        y: u32,
    ) -> Result<TxReceipt, ClientError> {
        let nullifier = Nullifier::derive(offer.session_id, &offer.initiator, &self.address());
        let treasure_hash = commit(x, y, &nullifier)?;
        let cosigned = assembler::co_sign_session(
            self.ledger.as_ref(),
            self.signer.as_ref(),
            offer,
            stake,
            treasure_hash,
            self.config.auth_ttl,
        )
        .await?;
        let receipt =
            assembler::finalize_session(self.ledger.as_ref(), self.signer.as_ref(), &cosigned)
                .await?;
        Ok(receipt)
    }

    /// Prove knowledge of the treasure location and submit the proof with
    /// the claimed energy cost.
    ///
    /// Proving runs on the worker boundary; the coordinates never leave it.
    /// `energy_used` is self-reported and recorded as claimed, which the
    /// gate documents as its open trust boundary. Per-player single
    /// submission is enforced by the gate, not here.
    pub async fn submit_found_treasure(
        &self,
        session_id: SessionId,
        x: u32,
        y: u32,
        energy_used: u32,
    ) -> Result<TxReceipt, ClientError> {
        let game = self.ledger.get_game(session_id).await?;
        let nullifier = Nullifier::derive(session_id, &game.player1, &game.player2);
        let worker = spawn_prover(
            Arc::clone(&self.prover),
            PrivateInputs { x, y, nullifier },
            game.treasure_hash,
            Arc::clone(&self.metrics),
        );
        let proof = worker.wait().await?;

        let invocation = Invocation::submit_zk_proof(
            session_id,
            self.address(),
            proof.bytes,
            *proof.public_output.as_bytes(),
            energy_used,
        );
        self.send_own(invocation).await
    }

    /// Resolve the session. Permissionless: any funded account may call
    /// this, and repeat calls return the recorded outcome.
    pub async fn resolve(&self, session_id: SessionId) -> Result<Outcome, ClientError> {
        let receipt = self.send_own(Invocation::resolve_game(session_id)).await?;
        receipt
            .return_value
            .outcome()
            .ok_or(ClientError::MissingOutcome)
    }

    pub async fn game(&self, session_id: SessionId) -> Result<Game, ClientError> {
        Ok(self.ledger.get_game(session_id).await?)
    }

    pub async fn treasure_hash(&self, session_id: SessionId) -> Result<Commitment, ClientError> {
        Ok(self.ledger.get_treasure_hash(session_id).await?)
    }

    /// Poll the ledger until the session satisfies `predicate`, bounded by
    /// the configured deadline.
    pub async fn wait_for(
        &self,
        session_id: SessionId,
        predicate: impl Fn(&Game) -> bool,
    ) -> Result<Game, ClientError> {
        Ok(sync::wait_for_game(self.ledger.as_ref(), session_id, self.config.poll(), predicate)
            .await?)
    }

    pub fn save_board(
        &self,
        session_id: SessionId,
        snapshot: &BoardSnapshot,
    ) -> Result<(), ClientError> {
        Ok(self.store.save(&self.board_key(session_id), snapshot)?)
    }

    pub fn load_board(
        &self,
        session_id: SessionId,
    ) -> Result<Option<BoardSnapshot>, ClientError> {
        Ok(self.store.load(&self.board_key(session_id))?)
    }

    pub fn delete_board(&self, session_id: SessionId) -> Result<(), ClientError> {
        Ok(self.store.delete(&self.board_key(session_id))?)
    }

    fn board_key(&self, session_id: SessionId) -> BoardKey {
        BoardKey {
            session_id,
            player: self.address(),
        }
    }

    /// Single-party path: simulate, sign every entry scoped to this
    /// client's own credential, wrap in an envelope and broadcast.
    async fn send_own(&self, invocation: Invocation) -> Result<TxReceipt, ClientError> {
        let source = self.address();
        let account = self.ledger.account(&source).await?;
        let mut tx = Transaction {
            source,
            sequence: account.sequence + 1,
            fee: BASE_FEE,
            invocation,
            auth: Vec::new(),
        };
        let sim = self.ledger.simulate(&tx).await?;
        let expiry = self.ledger.current_sequence().await? + self.config.auth_ttl;
        tx.fee = sim.fee;
        tx.auth = sim
            .required_auth
            .into_iter()
            .map(|entry| {
                if entry.credential == source {
                    self.signer.sign_authorization(entry, expiry)
                } else {
                    entry
                }
            })
            .collect();
        Ok(self.ledger.submit(self.signer.sign_envelope(tx)).await?)
    }
}
