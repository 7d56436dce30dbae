//! Domain model for the treasure-hunt session protocol.
//!
//! Everything the ledger contract and the client agree on lives here: the
//! per-session [`Game`] record, [`Outcome`] derivation, the commitment codec
//! that binds secret treasure coordinates to a session, and the numbered
//! [`ContractError`] codes surfaced by the gate.
//!
//! The crate is deliberately free of ledger and proof-system concerns so the
//! same types can back an in-process ledger, a remote deployment, and tests.

pub mod commitment;
pub mod error;
pub mod types;

pub use commitment::{COORD_LIMIT, CommitError, Commitment, Nullifier, commit};
pub use error::ContractError;
pub use types::{Address, Game, Outcome, PlayerSlot, SessionId};
