//! Ledger-level error taxonomy.

use protocol::{Address, ContractError, SessionId};

use crate::types::{Function, Sequence};

/// Everything a ledger interaction can fail with.
///
/// [`Contract`](LedgerError::Contract) carries the six numbered gate codes;
/// the remaining variants are host-level. Only [`Transport`](LedgerError::Transport)
/// is ever worth an automatic retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("contract error {}: {}", .0.code(), .0)]
    Contract(#[from] ContractError),

    #[error("proof verification failed")]
    VerificationFailed,

    #[error("no authorization entry for {address} covering {function}")]
    AuthorizationMissing { address: Address, function: Function },

    #[error("authorization signature for {address} is missing or invalid")]
    AuthorizationInvalid { address: Address },

    #[error("authorization for {address} expired at sequence {expiry}, current is {current}")]
    AuthorizationExpired {
        address: Address,
        expiry: Sequence,
        current: Sequence,
    },

    #[error("authorization nonce {nonce} for {address} already consumed")]
    AuthorizationReplayed { address: Address, nonce: u64 },

    #[error("account {0} not found")]
    AccountNotFound(Address),

    #[error("account {address} holds {balance}, stake requires {stake}")]
    InsufficientStake {
        address: Address,
        stake: i128,
        balance: i128,
    },

    #[error("balance {balance} cannot cover fee {fee}")]
    InsufficientFee { balance: i128, fee: u64 },

    #[error("bad transaction sequence: expected {expected}, got {got}")]
    BadSequence { expected: u64, got: u64 },

    #[error("session {0} already exists")]
    SessionExists(SessionId),

    #[error("malformed invocation: {0}")]
    MalformedInvocation(String),

    #[error("transaction envelope is unsigned")]
    EnvelopeUnsigned,

    #[error("transaction envelope signature is invalid")]
    EnvelopeSignatureInvalid,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("ledger invariant violated: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Transient availability failures; everything else is a verdict.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
