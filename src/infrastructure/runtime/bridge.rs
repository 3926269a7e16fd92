//! Runtime bridge - connects the sync TUI thread with the async query worker
//!
//! The worker runs on a single-threaded Tokio runtime in its own OS thread;
//! the TUI sends commands and polls events without ever blocking on I/O.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::domain::QueryState;
use crate::infrastructure::ethereum::{create_provider, ProviderConfig, WalletSession};
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::pipeline::{Pipeline, QueryOrchestrator};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Text in the input box changed
    InputChanged { value: String },
    /// Look up balances for the settled input
    Submit,
    /// Ask the wallet for an account
    ConnectWallet,
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Provider and wallet are set up
    Ready {
        endpoint: String,
        wallet_available: bool,
    },
    /// Debounced input value
    InputSettled { value: String },
    /// Wallet exposed an account; `prefill` is set when found at session start
    WalletConnected { address: Address, prefill: bool },
    /// Query state replaced
    QueryUpdated {
        generation: u64,
        state: QueryState,
        cached_queries: usize,
    },
    /// Error occurred outside the query pipeline
    Error { message: String },
}

/// Everything the worker needs, resolved from CLI + config
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub provider: ProviderConfig,
    pub wallet_rpc: Option<String>,
    pub debounce: Duration,
    pub metadata_concurrency: Option<usize>,
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: UnboundedSender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(settings: WorkerSettings) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded_channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        // Spawn the worker thread with its own Tokio runtime
        thread::Builder::new()
            .name("query-worker".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Failed to create Tokio runtime: {}", err),
                        });
                        return;
                    }
                };

                rt.block_on(async {
                    if let Err(err) = start_worker(settings, cmd_rx, evt_tx.clone()).await {
                        tracing::error!("worker exited: {:#}", err);
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Try to send shutdown command
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}

async fn start_worker(
    settings: WorkerSettings,
    cmd_rx: tokio::sync::mpsc::UnboundedReceiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> anyhow::Result<()> {
    let provider = create_provider(&settings.provider).await?;
    let endpoint = provider.endpoint_name();
    let orchestrator =
        QueryOrchestrator::with_pipeline(Pipeline::new(provider, settings.metadata_concurrency));

    let wallet = match WalletSession::open(settings.wallet_rpc.as_deref()).await {
        Ok(wallet) => wallet,
        Err(err) => {
            let _ = evt_tx.send(RuntimeEvent::Error {
                message: format!("{:#}", err),
            });
            WalletSession::new(None)
        }
    };

    let _ = evt_tx.send(RuntimeEvent::Ready {
        endpoint,
        wallet_available: wallet.is_available(),
    });

    run_async_worker(orchestrator, wallet, settings.debounce, cmd_rx, evt_tx).await
}
