//! Two-party treasure-hunt demo.
//!
//! Runs the whole protocol in one process against the in-process ledger:
//! Alice prepares a session offer, Bob imports and co-signs it, both prove
//! knowledge of the treasure location, and either party resolves. The
//! offer still travels as text between the two clients, the way it would
//! over a real out-of-band channel.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hunt_client::{BoardSnapshot, HuntClient, HuntConfig, SessionOffer};
use ledger::{Ledger, LocalLedger, LocalSigner, Signer};
use zk::{LocalProver, TranscriptVerifier};

const SESSION: u32 = 42;
const TREASURE_X: u32 = 3;
const TREASURE_Y: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // One shared node: the ledger is the only synchronization point
    // between the two parties.
    let node = Arc::new(LocalLedger::new(Arc::new(TranscriptVerifier::new())));
    let alice_key = Arc::new(LocalSigner::generate());
    let bob_key = Arc::new(LocalSigner::generate());
    let placeholder = LocalSigner::generate();
    node.fund(alice_key.address(), 10_000).await;
    node.fund(bob_key.address(), 10_000).await;
    node.fund(placeholder.address(), 1_000).await;

    let mut config = HuntConfig::from_env();
    if config.placeholder.is_none() {
        config.placeholder = Some(placeholder.address());
    }

    let ledger: Arc<dyn Ledger> = node;
    let alice = client(&ledger, alice_key, &config)?;
    let bob = client(&ledger, bob_key, &config)?;
    info!(alice = %alice.address(), bob = %bob.address(), "parties ready");

    // Step A: Alice commits to the treasure location and signs her half.
    let offer = alice.open_session(SESSION, 100, TREASURE_X, TREASURE_Y).await?;
    let text = offer.encode()?;
    info!(chars = text.len(), "offer prepared; transferring out of band");

    // Steps B and C: Bob imports the text, co-signs and broadcasts.
    let received = SessionOffer::decode(&text)?;
    bob.join_session(&received, 250, TREASURE_X, TREASURE_Y).await?;

    let game = alice.wait_for(SESSION, |_| true).await?;
    info!(
        player1 = %game.player1,
        player2 = %game.player2,
        treasure_hash = %game.treasure_hash,
        "session live"
    );

    // Alice pauses her hunt partway and restores it, the way a restarted
    // client would.
    alice.save_board(
        SESSION,
        &BoardSnapshot {
            x: 1,
            y: 2,
            energy_used: 14,
            found_treasure: false,
        },
    )?;
    let restored = alice.load_board(SESSION)?;
    info!(?restored, "board snapshot restored");

    // Both players found the treasure; Alice spent less energy.
    alice
        .submit_found_treasure(SESSION, TREASURE_X, TREASURE_Y, 37)
        .await?;
    bob.submit_found_treasure(SESSION, TREASURE_X, TREASURE_Y, 52)
        .await?;
    bob.wait_for(SESSION, |g| {
        g.player1_energy.is_some() && g.player2_energy.is_some()
    })
    .await?;

    let outcome = bob.resolve(SESSION).await?;
    info!(?outcome, "session resolved");

    alice.delete_board(SESSION)?;
    Ok(())
}

fn client(
    ledger: &Arc<dyn Ledger>,
    signer: Arc<LocalSigner>,
    config: &HuntConfig,
) -> Result<HuntClient> {
    HuntClient::builder()
        .ledger(Arc::clone(ledger))
        .signer(signer)
        .prover(Arc::new(LocalProver::new()))
        .config(config.clone())
        .build()
}
