//! Client-facing ledger surface and the in-process node.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use zk::ProofVerifier;

use protocol::{Address, Commitment, ContractError, Game, SessionId};

use crate::auth::AuthorizationEntry;
use crate::contract::{Host, HuntContract};
use crate::error::{LedgerError, Result};
use crate::tx::{Transaction, TransactionEnvelope};
use crate::types::{AccountView, Arg, BASE_FEE, Function, ReturnValue, Sequence};

/// Result of a simulation pass: the unsigned authorization set the
/// invocation demands, and the fee a submission will be charged.
#[derive(Debug, Clone)]
pub struct SimulateResult {
    pub required_auth: Vec<AuthorizationEntry>,
    pub fee: u64,
}

/// Receipt for an applied transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub height: Sequence,
    pub fee_charged: u64,
    pub return_value: ReturnValue,
}

// ============================================================================
// Ledger Trait
// ============================================================================

/// The surface the session protocol drives.
///
/// Intentionally narrow: write access goes through simulate-then-submit,
/// reads are plain queries. Implementations are shared across tasks.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Run an invocation in recording mode and return the authorization
    /// entries it demands, unsigned.
    async fn simulate(&self, tx: &Transaction) -> Result<SimulateResult>;

    /// Validate, charge and apply a signed envelope. Fee and account
    /// sequence are consumed even when the invocation itself fails; session
    /// state only changes on success.
    async fn submit(&self, envelope: TransactionEnvelope) -> Result<TxReceipt>;

    async fn get_game(&self, session_id: SessionId) -> Result<Game>;

    async fn get_treasure_hash(&self, session_id: SessionId) -> Result<Commitment>;

    async fn account(&self, address: &Address) -> Result<AccountView>;

    /// Current ledger height; authorization expiry is measured against it.
    async fn current_sequence(&self) -> Result<Sequence>;
}

// ============================================================================
// Local Node
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct AccountEntry {
    balance: i128,
    sequence: u64,
}

struct NodeState {
    sequence: Sequence,
    accounts: HashMap<Address, AccountEntry>,
    consumed_nonces: HashSet<(Address, u64)>,
    contract: HuntContract,
}

/// In-process ledger node.
///
/// Both parties' clients hold the same instance in tests and demos, which
/// makes it the shared synchronization point the protocol assumes. The
/// proof verifier is injected at construction, mirroring an on-ledger
/// verifier deployment.
pub struct LocalLedger {
    state: RwLock<NodeState>,
    auth_nonces: AtomicU64,
    verifier: Arc<dyn ProofVerifier>,
}

impl LocalLedger {
    pub fn new(verifier: Arc<dyn ProofVerifier>) -> Self {
        Self {
            state: RwLock::new(NodeState {
                sequence: 1,
                accounts: HashMap::new(),
                consumed_nonces: HashSet::new(),
                contract: HuntContract::new(),
            }),
            auth_nonces: AtomicU64::new(0),
            verifier,
        }
    }

    /// Create or top up an account. Genesis helper for demos and tests.
    pub async fn fund(&self, address: Address, amount: i128) {
        let mut state = self.state.write().await;
        let entry = state.accounts.entry(address).or_insert(AccountEntry {
            balance: 0,
            sequence: 0,
        });
        entry.balance += amount;
    }

    /// Advance the ledger height without applying a transaction.
    pub async fn advance(&self, sequences: Sequence) {
        self.state.write().await.sequence += sequences;
    }
}

#[async_trait]
impl Ledger for LocalLedger {
    async fn simulate(&self, tx: &Transaction) -> Result<SimulateResult> {
        let state = self.state.read().await;
        let mut contract = state.contract.clone();
        let mut host = RecordingHost {
            accounts: &state.accounts,
            verifier: self.verifier.as_ref(),
            nonces: &self.auth_nonces,
            recorded: Vec::new(),
        };
        contract.execute(&mut host, &tx.invocation)?;
        debug!(
            function = %tx.invocation.function,
            entries = host.recorded.len(),
            "simulation recorded authorization set"
        );
        Ok(SimulateResult {
            required_auth: host.recorded,
            fee: BASE_FEE,
        })
    }

    async fn submit(&self, envelope: TransactionEnvelope) -> Result<TxReceipt> {
        envelope.verify()?;
        let tx = envelope.tx;

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let account = state
            .accounts
            .get_mut(&tx.source)
            .ok_or(LedgerError::AccountNotFound(tx.source))?;
        let expected = account.sequence + 1;
        if tx.sequence != expected {
            return Err(LedgerError::BadSequence {
                expected,
                got: tx.sequence,
            });
        }
        if account.balance < tx.fee as i128 {
            return Err(LedgerError::InsufficientFee {
                balance: account.balance,
                fee: tx.fee,
            });
        }
        // Fee and sequence are consumed whether or not the invocation
        // succeeds; only session state stays untouched on failure.
        account.balance -= tx.fee as i128;
        account.sequence = tx.sequence;
        state.sequence += 1;
        let height = state.sequence;

        let mut host = EnforcingHost {
            accounts: &state.accounts,
            consumed: &state.consumed_nonces,
            auth: &tx.auth,
            current_sequence: height,
            verifier: self.verifier.as_ref(),
            used: Vec::new(),
        };
        let applied = state.contract.execute(&mut host, &tx.invocation);
        let EnforcingHost { used, .. } = host;

        match applied {
            Ok(return_value) => {
                state.consumed_nonces.extend(used);
                info!(height, function = %tx.invocation.function, "transaction applied");
                Ok(TxReceipt {
                    height,
                    fee_charged: tx.fee,
                    return_value,
                })
            }
            Err(err) => {
                debug!(height, function = %tx.invocation.function, %err, "transaction failed");
                Err(err)
            }
        }
    }

    async fn get_game(&self, session_id: SessionId) -> Result<Game> {
        let state = self.state.read().await;
        state
            .contract
            .game(session_id)
            .cloned()
            .ok_or_else(|| ContractError::GameNotFound.into())
    }

    async fn get_treasure_hash(&self, session_id: SessionId) -> Result<Commitment> {
        let state = self.state.read().await;
        state
            .contract
            .treasure_hash(session_id)
            .ok_or_else(|| ContractError::GameNotFound.into())
    }

    async fn account(&self, address: &Address) -> Result<AccountView> {
        let state = self.state.read().await;
        state
            .accounts
            .get(address)
            .map(|entry| AccountView {
                balance: entry.balance,
                sequence: entry.sequence,
            })
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    async fn current_sequence(&self) -> Result<Sequence> {
        Ok(self.state.read().await.sequence)
    }
}

// ============================================================================
// Hosts
// ============================================================================

/// Simulation host: grants every demand and records it as an unsigned entry.
struct RecordingHost<'a> {
    accounts: &'a HashMap<Address, AccountEntry>,
    verifier: &'a dyn ProofVerifier,
    nonces: &'a AtomicU64,
    recorded: Vec<AuthorizationEntry>,
}

impl Host for RecordingHost<'_> {
    fn require_auth(
        &mut self,
        address: &Address,
        function: Function,
        args: &[Arg],
    ) -> Result<()> {
        let nonce = self.nonces.fetch_add(1, Ordering::Relaxed);
        self.recorded.push(AuthorizationEntry::unsigned(
            *address,
            function,
            args.to_vec(),
            nonce,
        ));
        Ok(())
    }

    fn balance(&self, address: &Address) -> Result<i128> {
        self.accounts
            .get(address)
            .map(|entry| entry.balance)
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    fn verify_proof(&self, proof: &[u8], public_input: &Commitment) -> bool {
        self.verifier.verify(proof, public_input)
    }
}

/// Apply host: every demand must be covered by a signed, unexpired,
/// unconsumed entry in the transaction's authorization set.
struct EnforcingHost<'a> {
    accounts: &'a HashMap<Address, AccountEntry>,
    consumed: &'a HashSet<(Address, u64)>,
    auth: &'a [AuthorizationEntry],
    current_sequence: Sequence,
    verifier: &'a dyn ProofVerifier,
    used: Vec<(Address, u64)>,
}

impl Host for EnforcingHost<'_> {
    fn require_auth(
        &mut self,
        address: &Address,
        function: Function,
        args: &[Arg],
    ) -> Result<()> {
        let fingerprint = AuthorizationEntry::scope_fingerprint_of(function, args);
        let entry = self
            .auth
            .iter()
            .find(|e| e.credential == *address && e.scope_fingerprint() == fingerprint)
            .ok_or(LedgerError::AuthorizationMissing {
                address: *address,
                function,
            })?;
        if !entry.verify_signature() {
            return Err(LedgerError::AuthorizationInvalid { address: *address });
        }
        if entry.expiry_sequence < self.current_sequence {
            return Err(LedgerError::AuthorizationExpired {
                address: *address,
                expiry: entry.expiry_sequence,
                current: self.current_sequence,
            });
        }
        let key = (*address, entry.nonce);
        if self.consumed.contains(&key) || self.used.contains(&key) {
            return Err(LedgerError::AuthorizationReplayed {
                address: *address,
                nonce: entry.nonce,
            });
        }
        self.used.push(key);
        Ok(())
    }

    fn balance(&self, address: &Address) -> Result<i128> {
        self.accounts
            .get(address)
            .map(|entry| entry.balance)
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    fn verify_proof(&self, proof: &[u8], public_input: &Commitment) -> bool {
        self.verifier.verify(proof, public_input)
    }
}
