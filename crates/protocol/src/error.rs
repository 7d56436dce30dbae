//! Wire error codes shared by the contract and every client surface.

use serde::{Deserialize, Serialize};

/// Contract-level rejection codes.
///
/// Discriminants are the on-ledger error codes. Each one is a terminal
/// verdict for the invocation that produced it; none is retryable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum ContractError {
    #[error("game not found")]
    GameNotFound = 1,
    #[error("caller is not a player in this game")]
    NotPlayer = 2,
    #[error("player already submitted a proof")]
    AlreadySubmitted = 3,
    #[error("neither player has submitted a proof")]
    NeitherPlayerSubmitted = 4,
    #[error("game already resolved")]
    GameAlreadyResolved = 5,
    #[error("public input does not match the stored treasure hash")]
    PublicInputMismatch = 6,
}

impl ContractError {
    /// Numeric code as recorded on the ledger.
    pub const fn code(self) -> u32 {
        self as u32
    }
}
