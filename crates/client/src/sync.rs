//! Bounded polling against the shared ledger.
//!
//! The ledger is the only synchronization point between the two parties, so
//! each client converges on state it did not cause (the counterparty
//! co-signing, a proof landing, resolution) by re-reading at a fixed
//! interval. Polling is bounded by a hard deadline, after which the caller
//! is told to retry manually; nothing here blocks indefinitely. Polling
//! only reads, so a restarted client that re-polls duplicates no stateful
//! action.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::warn;

use ledger::{Ledger, LedgerError};
use protocol::{ContractError, Game, SessionId};

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub deadline: Duration,
    /// Consecutive transient failures tolerated before giving up early.
    pub max_transport_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            deadline: Duration::from_secs(30),
            max_transport_failures: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("session state did not converge within {0:?}; check manually")]
    Deadline(Duration),

    #[error("{failures} consecutive transport failures, last: {last}")]
    TransportCeiling { failures: u32, last: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Poll until the observed session record satisfies `predicate`.
///
/// A missing session counts as "not yet" so callers can wait for creation
/// to land. Transient transport failures are retried inside the deadline up
/// to the configured ceiling; every other error is a verdict and propagates
/// immediately.
pub async fn wait_for_game(
    ledger: &dyn Ledger,
    session_id: SessionId,
    config: PollConfig,
    predicate: impl Fn(&Game) -> bool,
) -> Result<Game, SyncError> {
    let deadline = Instant::now() + config.deadline;
    let mut transport_failures = 0u32;
    loop {
        match ledger.get_game(session_id).await {
            Ok(game) => {
                transport_failures = 0;
                if predicate(&game) {
                    return Ok(game);
                }
            }
            Err(LedgerError::Contract(ContractError::GameNotFound)) => {
                transport_failures = 0;
            }
            Err(err) if err.is_transient() => {
                transport_failures += 1;
                warn!(session_id, %err, transport_failures, "transient ledger failure");
                if transport_failures >= config.max_transport_failures {
                    return Err(SyncError::TransportCeiling {
                        failures: transport_failures,
                        last: err.to_string(),
                    });
                }
            }
            Err(err) => return Err(err.into()),
        }
        if Instant::now() + config.interval > deadline {
            return Err(SyncError::Deadline(config.deadline));
        }
        sleep(config.interval).await;
    }
}
