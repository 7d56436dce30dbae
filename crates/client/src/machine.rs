//! Session phase tracking.
//!
//! The phase is a pure function of the ledger-observed [`Game`] plus the
//! local protocol step, never of optimistic local mutation. Two clients
//! polling the same ledger therefore classify the same phase, whichever of
//! them caused the last transition.

use serde::{Deserialize, Serialize};

use protocol::Game;

/// Protocol step this client last completed locally. Only relevant while
/// the session is not yet observable on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalStep {
    /// Step A done: the offer exists, nothing on the ledger yet.
    Offered,
    /// Step B done: co-signed, broadcast not yet observed.
    CoSigned,
}

/// Observable phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Prepared,
    CoSigned,
    Finalized,
    /// At least one verified proof has landed; resolution is pending.
    ProofPending,
    Resolved,
}

impl SessionPhase {
    /// Classify from what the ledger shows, falling back to the local step
    /// only while the session record does not exist yet.
    pub fn classify(local: LocalStep, observed: Option<&Game>) -> Self {
        match observed {
            Some(game) if game.resolved => Self::Resolved,
            Some(game)
                if game.player1_energy.is_some() || game.player2_energy.is_some() =>
            {
                Self::ProofPending
            }
            Some(_) => Self::Finalized,
            None => match local {
                LocalStep::Offered => Self::Prepared,
                LocalStep::CoSigned => Self::CoSigned,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Address, Commitment, PlayerSlot};

    fn game() -> Game {
        Game::new(
            Address::from_bytes([1; 32]),
            Address::from_bytes([2; 32]),
            100,
            250,
            Commitment::from_bytes([0xAB; 32]),
        )
    }

    #[test]
    fn unobserved_sessions_follow_the_local_step() {
        assert_eq!(
            SessionPhase::classify(LocalStep::Offered, None),
            SessionPhase::Prepared
        );
        assert_eq!(
            SessionPhase::classify(LocalStep::CoSigned, None),
            SessionPhase::CoSigned
        );
    }

    #[test]
    fn ledger_observation_overrides_the_local_step() {
        let game = game();
        assert_eq!(
            SessionPhase::classify(LocalStep::Offered, Some(&game)),
            SessionPhase::Finalized
        );
    }

    #[test]
    fn phases_advance_with_submissions_and_resolution() {
        let mut game = game();
        game.set_energy(PlayerSlot::Player2, 9);
        assert_eq!(
            SessionPhase::classify(LocalStep::CoSigned, Some(&game)),
            SessionPhase::ProofPending
        );
        game.resolved = true;
        assert_eq!(
            SessionPhase::classify(LocalStep::CoSigned, Some(&game)),
            SessionPhase::Resolved
        );
    }
}
