//! Client builder with dependency injection.

use std::sync::Arc;

use anyhow::{Context, Result};

use ledger::{Ledger, Signer};
use zk::Prover;

use crate::client::HuntClient;
use crate::config::HuntConfig;
use crate::store::{BoardStore, FileBoardStore};
use crate::worker::ProofMetrics;

/// Builder for a [`HuntClient`].
///
/// Ledger, signer and prover are required; the board store defaults to a
/// file store under the configured data directory, and the configuration
/// defaults to [`HuntConfig::default`]. Missing required fields fail
/// `build()` with a message naming the setter.
#[derive(Default)]
pub struct HuntClientBuilder {
    ledger: Option<Arc<dyn Ledger>>,
    signer: Option<Arc<dyn Signer>>,
    prover: Option<Arc<dyn Prover>>,
    store: Option<Arc<dyn BoardStore>>,
    config: Option<HuntConfig>,
}

impl HuntClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn prover(mut self, prover: Arc<dyn Prover>) -> Self {
        self.prover = Some(prover);
        self
    }

    /// Override the default file-backed board store.
    pub fn store(mut self, store: Arc<dyn BoardStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: HuntConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<HuntClient> {
        let ledger = self
            .ledger
            .context("Ledger is required. Use .ledger() to set it.")?;
        let signer = self
            .signer
            .context("Signer is required. Use .signer() to set it.")?;
        let prover = self
            .prover
            .context("Prover is required. Use .prover() to set it.")?;
        let config = self.config.unwrap_or_default();
        let store = match self.store {
            Some(store) => store,
            None => Arc::new(
                FileBoardStore::new(config.data_dir.join("boards"))
                    .context("failed to open the board store")?,
            ),
        };

        Ok(HuntClient {
            ledger,
            signer,
            prover,
            store,
            config,
            metrics: Arc::new(ProofMetrics::new()),
        })
    }
}
