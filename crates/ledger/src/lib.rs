//! Ledger layer for the treasure-hunt protocol.
//!
//! The shared ledger is the only synchronization point between the two
//! parties. This crate models the surface their clients need:
//!
//! - [`Ledger`] - async trait the client drives: simulate, submit, and the
//!   read-only session queries. [`LocalLedger`] is the in-process node both
//!   parties share in tests and demos; a remote RPC backend would implement
//!   the same trait.
//! - [`contract`] - the on-ledger treasure-hunt contract: session creation
//!   under dual authorization, the proof-gated submission endpoint, and the
//!   resolution engine.
//! - [`auth`] - credential-scoped, time-bounded [`AuthorizationEntry`]
//!   values. Simulation records the unsigned set; apply enforces signatures,
//!   expiry and replay nonces.
//! - [`signer`] - the signing capability: detached authorization-entry
//!   signatures and outer envelope signatures, never shared key material.
//!
//! Layering mirrors a Soroban-style host: contracts demand authorizations
//! and balances through a narrow host seam, and proof verification is an
//! external collaborator injected at node construction.

pub mod auth;
pub mod contract;
mod digest;
pub mod error;
pub mod node;
pub mod signer;
pub mod tx;
pub mod types;

pub use auth::AuthorizationEntry;
pub use error::{LedgerError, Result};
pub use node::{Ledger, LocalLedger, SimulateResult, TxReceipt};
pub use signer::{LocalSigner, Signer};
pub use tx::{Invocation, Transaction, TransactionEnvelope};
pub use types::{AccountView, Arg, BASE_FEE, Function, ReturnValue, Sequence};
