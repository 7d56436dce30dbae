//! Proof worker boundary.
//!
//! Proof generation is CPU-bound and multi-second, so it runs on a
//! blocking task behind a message channel. The private inputs move into
//! the worker by value and are dropped there; the only data that crosses
//! back out is the terminal [`ProofMessage`], whose success variant carries
//! nothing beyond the proof bytes and the public output.
//!
//! Exactly one terminal message is produced per request. Cancellation is
//! termination: an aborted worker discards any in-flight proof, and retry
//! is a caller decision, never automatic.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use protocol::Commitment;
use zk::{PrivateInputs, ProofData, ProofError, Prover, TRANSCRIPT_MODE};

/// Messages a proof worker emits: zero or more progress updates, then one
/// terminal verdict.
#[derive(Debug)]
pub enum ProofMessage {
    Status(String),
    Ready(ProofData),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("proof generation failed: {0}")]
    Failed(String),

    #[error("proof worker terminated without a verdict")]
    Terminated,
}

/// Proof generation counters, shared via `Arc` with whoever wants to
/// observe them. Atomics keep access lock-free across tasks.
#[derive(Debug, Default)]
pub struct ProofMetrics {
    generated: AtomicU64,
    failed: AtomicU64,
    total_proving_time_nanos: AtomicU64,
}

impl ProofMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, proving_time: Duration) {
        self.generated.fetch_add(1, Ordering::Relaxed);
        self.total_proving_time_nanos
            .fetch_add(proving_time.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn avg_proving_time(&self) -> Duration {
        let generated = self.generated.load(Ordering::Relaxed);
        if generated == 0 {
            Duration::ZERO
        } else {
            let total = self.total_proving_time_nanos.load(Ordering::Relaxed);
            Duration::from_nanos(total / generated)
        }
    }
}

/// Handle to a running proof worker.
pub struct ProofWorker {
    rx: mpsc::Receiver<ProofMessage>,
    task: JoinHandle<()>,
}

impl ProofWorker {
    /// Next message, in order. `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<ProofMessage> {
        self.rx.recv().await
    }

    /// Drain progress messages and return the terminal verdict.
    pub async fn wait(mut self) -> Result<ProofData, WorkerError> {
        while let Some(message) = self.rx.recv().await {
            match message {
                ProofMessage::Status(text) => debug!(%text, "prover progress"),
                ProofMessage::Ready(proof) => return Ok(proof),
                ProofMessage::Failed(reason) => return Err(WorkerError::Failed(reason)),
            }
        }
        Err(WorkerError::Terminated)
    }

    /// Terminate the worker. An in-flight proof is discarded, not resumed;
    /// nothing observes its result afterwards.
    pub fn abort(self) {
        self.task.abort();
    }
}

/// Start proving `inputs` against `public_input` on a blocking task.
///
/// The proof is generated under the pinned [`TRANSCRIPT_MODE`]; the gate
/// verifier is keyed the same way, so mode drift cannot creep in per call.
pub fn spawn_prover(
    prover: Arc<dyn Prover>,
    inputs: PrivateInputs,
    public_input: Commitment,
    metrics: Arc<ProofMetrics>,
) -> ProofWorker {
    let (tx, rx) = mpsc::channel(8);
    let task = tokio::spawn(async move {
        let _ = tx
            .send(ProofMessage::Status("executing witness".into()))
            .await;

        // Private inputs move into the blocking closure and drop with it.
        let result = tokio::task::spawn_blocking(move || {
            let witness = prover.execute(&inputs, &public_input)?;
            let proving_start = Instant::now();
            let proof = prover.prove(&witness, TRANSCRIPT_MODE)?;
            Ok::<_, ProofError>((proof, proving_start.elapsed()))
        })
        .await;

        let message = match result {
            Ok(Ok((proof, proving_time))) => {
                metrics.record_success(proving_time);
                debug!(
                    public_output = %proof.public_output,
                    proving_ms = proving_time.as_millis() as u64,
                    "proof ready"
                );
                ProofMessage::Ready(proof)
            }
            Ok(Err(err)) => {
                metrics.record_failure();
                ProofMessage::Failed(err.to_string())
            }
            Err(join_err) => {
                metrics.record_failure();
                ProofMessage::Failed(format!("proving task failed: {join_err}"))
            }
        };
        if tx.send(message).await.is_err() {
            warn!("proof worker verdict dropped: receiver gone");
        }
    });
    ProofWorker { rx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Nullifier, commit};
    use zk::LocalProver;

    fn prover() -> Arc<dyn Prover> {
        Arc::new(LocalProver::new())
    }

    fn inputs() -> PrivateInputs {
        PrivateInputs {
            x: 3,
            y: 5,
            nullifier: Nullifier::from_u64(42),
        }
    }

    #[tokio::test]
    async fn worker_delivers_status_then_ready() {
        let public = commit(3, 5, &Nullifier::from_u64(42)).unwrap();
        let metrics = Arc::new(ProofMetrics::new());
        let mut worker = spawn_prover(prover(), inputs(), public, Arc::clone(&metrics));

        let first = worker.recv().await.unwrap();
        assert!(matches!(first, ProofMessage::Status(_)));
        let second = worker.recv().await.unwrap();
        match second {
            ProofMessage::Ready(proof) => assert_eq!(proof.public_output, public),
            other => panic!("expected Ready, got {other:?}"),
        }
        // Terminal message is the last one.
        assert!(worker.recv().await.is_none());
        assert_eq!(metrics.generated(), 1);
        assert_eq!(metrics.failed(), 0);
    }

    #[tokio::test]
    async fn wait_returns_the_proof() {
        let public = commit(3, 5, &Nullifier::from_u64(42)).unwrap();
        let metrics = Arc::new(ProofMetrics::new());
        let worker = spawn_prover(prover(), inputs(), public, metrics);
        let proof = worker.wait().await.unwrap();
        assert_eq!(proof.public_output, public);
    }

    #[tokio::test]
    async fn unsatisfiable_inputs_fail_without_retry() {
        // Public input commits to different coordinates.
        let public = commit(4, 4, &Nullifier::from_u64(42)).unwrap();
        let metrics = Arc::new(ProofMetrics::new());
        let worker = spawn_prover(prover(), inputs(), public, Arc::clone(&metrics));
        let err = worker.wait().await.unwrap_err();
        assert!(matches!(err, WorkerError::Failed(_)));
        assert_eq!(metrics.failed(), 1);
        assert_eq!(metrics.generated(), 0);
    }

    #[test]
    fn metrics_average_over_successes() {
        let metrics = ProofMetrics::new();
        assert_eq!(metrics.avg_proving_time(), Duration::ZERO);
        metrics.record_success(Duration::from_millis(10));
        metrics.record_success(Duration::from_millis(30));
        assert_eq!(metrics.avg_proving_time(), Duration::from_millis(20));
    }
}
