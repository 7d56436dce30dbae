//! Core ledger value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use protocol::{Address, Outcome};

/// Ledger height. Advances once per applied transaction; authorization
/// expiry windows are measured against it.
pub type Sequence = u32;

/// Flat per-transaction fee charged to the envelope source.
pub const BASE_FEE: u64 = 100;

/// Balance and transaction sequence of an account, as read from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub balance: i128,
    /// Sequence of the last applied transaction; the next submission must
    /// carry `sequence + 1`.
    pub sequence: u64,
}

/// Contract entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    StartGame,
    SubmitZkProof,
    ResolveGame,
}

impl Function {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartGame => "start_game",
            Self::SubmitZkProof => "submit_zk_proof",
            Self::ResolveGame => "resolve_game",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed invocation argument.
///
/// Arguments are compared structurally when matching authorization scopes,
/// so two parties that computed the same values produce the same scope
/// fingerprint without any canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arg {
    U32(u32),
    I128(i128),
    Addr(Address),
    Bytes32([u8; 32]),
    Bytes(Vec<u8>),
}

/// Value returned by an applied invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnValue {
    Unit,
    Outcome(Outcome),
}

impl ReturnValue {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Outcome(outcome) => Some(*outcome),
            Self::Unit => None,
        }
    }
}

impl Arg {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I128(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_addr(&self) -> Option<Address> {
        match self {
            Self::Addr(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes32(&self) -> Option<[u8; 32]> {
        match self {
            Self::Bytes32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }
}
