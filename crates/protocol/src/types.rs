//! Session records and outcome derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;

/// Session identifier, chosen off-ledger by the initiating party.
pub type SessionId = u32;

/// Opaque 32-byte account identity.
///
/// The ledger layer reads it as an Ed25519 verifying key when it checks
/// signatures; the domain model only ever compares it for equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl Address {
    pub const LEN: usize = 32;

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    /// Shortened hex form for logs: leading four bytes, `..`, trailing two.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = hex::encode(self.0);
        write!(f, "{}..{}", &full[..8], &full[full.len() - 4..])
    }
}

/// Which side of a session an address occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerSlot {
    Player1,
    Player2,
}

/// Authoritative per-session record kept by the ledger contract.
///
/// Identities, stakes and the treasure commitment are fixed at creation.
/// Each energy field is written at most once, by that player's verified
/// proof, and `resolved` flips from false to true exactly once. No field
/// ever mutates outside those two transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub player1: Address,
    pub player2: Address,
    pub player1_points: i128,
    pub player2_points: i128,
    pub player1_energy: Option<u32>,
    pub player2_energy: Option<u32>,
    pub resolved: bool,
    pub treasure_hash: Commitment,
}

impl Game {
    pub fn new(
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
        treasure_hash: Commitment,
    ) -> Self {
        Self {
            player1,
            player2,
            player1_points,
            player2_points,
            player1_energy: None,
            player2_energy: None,
            resolved: false,
            treasure_hash,
        }
    }

    /// Slot occupied by `address`, if it is one of the two players.
    /// Player 1 wins the comparison when both slots hold the same address.
    pub fn slot_of(&self, address: &Address) -> Option<PlayerSlot> {
        if self.player1 == *address {
            Some(PlayerSlot::Player1)
        } else if self.player2 == *address {
            Some(PlayerSlot::Player2)
        } else {
            None
        }
    }

    pub fn energy(&self, slot: PlayerSlot) -> Option<u32> {
        match slot {
            PlayerSlot::Player1 => self.player1_energy,
            PlayerSlot::Player2 => self.player2_energy,
        }
    }

    pub fn set_energy(&mut self, slot: PlayerSlot, energy: u32) {
        match slot {
            PlayerSlot::Player1 => self.player1_energy = Some(energy),
            PlayerSlot::Player2 => self.player2_energy = Some(energy),
        }
    }

    pub fn has_submitted(&self, slot: PlayerSlot) -> bool {
        self.energy(slot).is_some()
    }

    pub fn stake(&self, slot: PlayerSlot) -> i128 {
        match slot {
            PlayerSlot::Player1 => self.player1_points,
            PlayerSlot::Player2 => self.player2_points,
        }
    }
}

/// Result of a resolved session.
///
/// Derived from the two energies at the resolution transition and recorded
/// separately by the contract; never stored inside [`Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Player1Won,
    Player2Won,
    BothFoundTreasure,
    NeitherFound,
}

impl Outcome {
    /// Winner table over the submitted energies. Lower energy wins; a tie
    /// counts as both players finding the treasure. Returns `None` when
    /// neither player has submitted, which the contract refuses to resolve.
    pub fn from_energies(player1: Option<u32>, player2: Option<u32>) -> Option<Self> {
        match (player1, player2) {
            (None, None) => None,
            (Some(_), None) => Some(Self::Player1Won),
            (None, Some(_)) => Some(Self::Player2Won),
            (Some(e1), Some(e2)) => Some(if e1 < e2 {
                Self::Player1Won
            } else if e2 < e1 {
                Self::Player2Won
            } else {
                Self::BothFoundTreasure
            }),
        }
    }

    /// Collapse to the single boolean downstream scoring wants.
    /// Ties go to player 1.
    pub fn player1_won(&self) -> bool {
        matches!(self, Self::Player1Won | Self::BothFoundTreasure)
    }
}
