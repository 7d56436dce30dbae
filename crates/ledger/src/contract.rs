//! The on-ledger treasure-hunt contract.
//!
//! Session creation under dual authorization, the proof-gated submission
//! endpoint, and the resolution engine. The contract touches the outside
//! world only through the [`Host`] seam: authorization demands, account
//! balances, and the external proof verifier.

use std::collections::HashMap;

use tracing::info;

use protocol::{Address, Commitment, ContractError, Game, Outcome, SessionId};

use crate::error::{LedgerError, Result};
use crate::tx::Invocation;
use crate::types::{Arg, Function, ReturnValue};

/// Execution environment the contract runs against.
///
/// A recording host collects authorization demands during simulation; an
/// enforcing host checks each demand against the transaction's signed set.
pub(crate) trait Host {
    fn require_auth(&mut self, address: &Address, function: Function, args: &[Arg])
    -> Result<()>;
    fn balance(&self, address: &Address) -> Result<i128>;
    fn verify_proof(&self, proof: &[u8], public_input: &Commitment) -> bool;
}

/// Contract storage: session records plus the outcome side table.
///
/// Outcomes are recorded once, at the resolution transition, and never
/// derived a second time; `Game` itself only carries the monotonic
/// `resolved` flag.
#[derive(Debug, Clone, Default)]
pub struct HuntContract {
    games: HashMap<SessionId, Game>,
    outcomes: HashMap<SessionId, Outcome>,
}

impl HuntContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn execute(
        &mut self,
        host: &mut dyn Host,
        invocation: &Invocation,
    ) -> Result<ReturnValue> {
        let args = &invocation.args;
        match invocation.function {
            Function::StartGame => {
                expect_arity(args, 6)?;
                self.start_game(
                    host,
                    arg(args, 0, Arg::as_u32, "u32 session id")?,
                    arg(args, 1, Arg::as_addr, "player1 address")?,
                    arg(args, 2, Arg::as_addr, "player2 address")?,
                    arg(args, 3, Arg::as_i128, "i128 player1 points")?,
                    arg(args, 4, Arg::as_i128, "i128 player2 points")?,
                    Commitment::from_bytes(arg(args, 5, Arg::as_bytes32, "32-byte hash")?),
                )?;
                Ok(ReturnValue::Unit)
            }
            Function::SubmitZkProof => {
                expect_arity(args, 5)?;
                let proof =
                    arg(args, 2, |a| a.as_bytes().map(<[u8]>::to_vec), "proof bytes")?;
                self.submit_zk_proof(
                    host,
                    arg(args, 0, Arg::as_u32, "u32 session id")?,
                    arg(args, 1, Arg::as_addr, "player address")?,
                    &proof,
                    arg(args, 3, Arg::as_bytes32, "32-byte public input")?,
                    arg(args, 4, Arg::as_u32, "u32 energy")?,
                )?;
                Ok(ReturnValue::Unit)
            }
            Function::ResolveGame => {
                expect_arity(args, 1)?;
                let outcome =
                    self.resolve_game(arg(args, 0, Arg::as_u32, "u32 session id")?)?;
                Ok(ReturnValue::Outcome(outcome))
            }
        }
    }

    /// Create a session. Both players must authorize `(session_id, own
    /// stake)`; the scoped args deliberately exclude the counterparty and
    /// the hash so either side can pre-sign before the other is known.
    fn start_game(
        &mut self,
        host: &mut dyn Host,
        session_id: SessionId,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
        treasure_hash: Commitment,
    ) -> Result<()> {
        host.require_auth(
            &player1,
            Function::StartGame,
            &[Arg::U32(session_id), Arg::I128(player1_points)],
        )?;
        host.require_auth(
            &player2,
            Function::StartGame,
            &[Arg::U32(session_id), Arg::I128(player2_points)],
        )?;

        // A second creation would rewrite the committed hash.
        if self.games.contains_key(&session_id) {
            return Err(LedgerError::SessionExists(session_id));
        }
        for (player, stake) in [(player1, player1_points), (player2, player2_points)] {
            let balance = host.balance(&player)?;
            if balance < stake {
                return Err(LedgerError::InsufficientStake {
                    address: player,
                    stake,
                    balance,
                });
            }
        }

        // The record becomes visible fully formed or not at all.
        self.games.insert(
            session_id,
            Game::new(player1, player2, player1_points, player2_points, treasure_hash),
        );
        info!(session_id, %player1, %player2, "game started");
        Ok(())
    }

    fn submit_zk_proof(
        &mut self,
        host: &mut dyn Host,
        session_id: SessionId,
        player: Address,
        proof: &[u8],
        public_inputs: [u8; 32],
        energy_used: u32,
    ) -> Result<()> {
        host.require_auth(
            &player,
            Function::SubmitZkProof,
            &[
                Arg::U32(session_id),
                Arg::Addr(player),
                Arg::Bytes(proof.to_vec()),
                Arg::Bytes32(public_inputs),
                Arg::U32(energy_used),
            ],
        )?;

        let game = self
            .games
            .get_mut(&session_id)
            .ok_or(ContractError::GameNotFound)?;
        let slot = game.slot_of(&player).ok_or(ContractError::NotPlayer)?;
        if game.resolved {
            return Err(ContractError::GameAlreadyResolved.into());
        }
        if game.has_submitted(slot) {
            return Err(ContractError::AlreadySubmitted.into());
        }
        // Opaque byte comparison; the gate never interprets the value.
        if public_inputs != *game.treasure_hash.as_bytes() {
            return Err(ContractError::PublicInputMismatch.into());
        }
        let treasure_hash = game.treasure_hash;
        if !host.verify_proof(proof, &treasure_hash) {
            // The whole submission aborts; nothing is recorded.
            return Err(LedgerError::VerificationFailed);
        }

        // energy_used is self-reported: the proof binds the commitment, not
        // the cost claim.
        game.set_energy(slot, energy_used);
        info!(session_id, %player, ?slot, energy_used, "proof accepted");
        Ok(())
    }

    /// Permissionless. Derives the outcome on the first call and records
    /// it; repeat calls return the recorded value untouched.
    fn resolve_game(&mut self, session_id: SessionId) -> Result<Outcome> {
        let game = self
            .games
            .get_mut(&session_id)
            .ok_or(ContractError::GameNotFound)?;
        if game.resolved {
            return self.outcomes.get(&session_id).copied().ok_or_else(|| {
                LedgerError::Internal(format!("resolved session {session_id} has no outcome"))
            });
        }
        let outcome = Outcome::from_energies(game.player1_energy, game.player2_energy)
            .ok_or(ContractError::NeitherPlayerSubmitted)?;
        game.resolved = true;
        self.outcomes.insert(session_id, outcome);
        info!(session_id, ?outcome, "game resolved");
        Ok(outcome)
    }

    pub fn game(&self, session_id: SessionId) -> Option<&Game> {
        self.games.get(&session_id)
    }

    pub fn treasure_hash(&self, session_id: SessionId) -> Option<Commitment> {
        self.games.get(&session_id).map(|g| g.treasure_hash)
    }
}

fn expect_arity(args: &[Arg], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(LedgerError::MalformedInvocation(format!(
            "expected {expected} arguments, got {}",
            args.len()
        )))
    }
}

fn arg<T>(
    args: &[Arg],
    index: usize,
    decode: impl Fn(&Arg) -> Option<T>,
    what: &str,
) -> Result<T> {
    args.get(index)
        .and_then(decode)
        .ok_or_else(|| LedgerError::MalformedInvocation(format!("argument {index} must be {what}")))
}
