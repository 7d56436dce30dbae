//! Treasure-hunt protocol client.
//!
//! Drives one party's side of the session protocol against a shared
//! [`ledger::Ledger`]:
//!
//! - [`assembler`] - the three-step dual-signing protocol that turns two
//!   independently-signed halves into one jointly-authorized
//!   session-creation transaction.
//! - [`worker`] - the proof worker boundary: proving runs on a blocking
//!   task behind message passing, and private coordinates never cross back
//!   out.
//! - [`sync`] - bounded polling that converges each client on ledger state
//!   it did not cause.
//! - [`machine`] - session phase classification from ledger reads.
//! - [`store`] - per-(session, player) board snapshot persistence.
//!
//! [`HuntClient`] is the facade tying these together; `src/main.rs` runs a
//! two-party demo on the in-process ledger.

pub mod assembler;
mod builder;
mod client;
pub mod config;
pub mod machine;
pub mod store;
pub mod sync;
pub mod worker;

pub use assembler::{AssembleError, CoSignedSession, SessionOffer, SignedAuthorizations};
pub use builder::HuntClientBuilder;
pub use client::{ClientError, HuntClient};
pub use config::HuntConfig;
pub use machine::{LocalStep, SessionPhase};
pub use store::{BoardKey, BoardSnapshot, BoardStore, FileBoardStore, StoreError};
pub use sync::{PollConfig, SyncError, wait_for_game};
pub use worker::{ProofMessage, ProofMetrics, ProofWorker, WorkerError, spawn_prover};
