//! Async worker - owns the orchestrator, debouncer and wallet session
//!
//! Everything runs on one cooperative scheduler. Network-bound query cycles
//! and wallet requests are polled from `FuturesUnordered` sets next to the
//! command channel, so neither a new trigger nor a pending wallet prompt
//! waits on anything else; the orchestrator's generation check decides which
//! query completion may touch the state.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::domain::QueryKey;
use crate::error::QueryError;
use crate::infrastructure::ethereum::WalletSession;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};
use crate::pipeline::{Begin, Debouncer, QueryOrchestrator, QueryOutcome, QueryTicket};

type InFlight = FuturesUnordered<BoxFuture<'static, (QueryTicket, QueryOutcome)>>;
type Connecting = FuturesUnordered<BoxFuture<'static, Result<Address, QueryError>>>;

/// Run the async worker loop
pub async fn run_async_worker(
    mut orchestrator: QueryOrchestrator,
    mut wallet: WalletSession,
    debounce: Duration,
    mut cmd_rx: UnboundedReceiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let settled = Arc::new(Mutex::new(String::new()));
    let mut debouncer = {
        let settled = Arc::clone(&settled);
        let evt_tx = evt_tx.clone();
        Debouncer::new(debounce, move |value: String| {
            if let Ok(mut current) = settled.lock() {
                current.clone_from(&value);
            }
            let _ = evt_tx.send(RuntimeEvent::InputSettled { value });
        })
    };

    // Session start: prefill with an account the wallet already exposes
    if let Some(address) = wallet.check_connected().await {
        tracing::info!(%address, "wallet already connected");
        if let Ok(mut current) = settled.lock() {
            *current = address.to_string();
        }
        let _ = evt_tx.send(RuntimeEvent::WalletConnected {
            address,
            prefill: true,
        });
    }

    let mut in_flight: InFlight = FuturesUnordered::new();
    let mut connecting: Connecting = FuturesUnordered::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    return Ok(());
                };
                match cmd {
                    RuntimeCommand::Shutdown => return Ok(()),

                    RuntimeCommand::InputChanged { value } => debouncer.push(value),

                    RuntimeCommand::Submit => {
                        // act on what was typed even if the burst has not settled
                        debouncer.flush();
                        let key = settled
                            .lock()
                            .map(|s| QueryKey::new(s.clone()))
                            .unwrap_or_else(|_| QueryKey::new(String::new()));
                        submit(&mut orchestrator, key, &mut in_flight, &evt_tx);
                    }

                    RuntimeCommand::ConnectWallet => {
                        if connecting.is_empty() {
                            connecting.push(wallet.request_account());
                        } else {
                            tracing::debug!("wallet request already pending");
                        }
                    }
                }
            }

            Some(result) = connecting.next(), if !connecting.is_empty() => match result {
                Ok(address) => {
                    wallet.mark_connected(address);
                    if let Ok(mut current) = settled.lock() {
                        *current = address.to_string();
                    }
                    debouncer.cancel();
                    let _ = evt_tx.send(RuntimeEvent::WalletConnected {
                        address,
                        prefill: false,
                    });
                }
                Err(err) => {
                    tracing::warn!("wallet connect failed: {}", err);
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: err.to_string(),
                    });
                }
            },

            Some((ticket, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                let generation = ticket.generation();
                if orchestrator.complete(ticket, outcome) {
                    publish(&orchestrator, generation, &evt_tx);
                }
            }
        }
    }
}

/// Begin a cycle; cache hits publish immediately, misses join the in-flight set
fn submit(
    orchestrator: &mut QueryOrchestrator,
    key: QueryKey,
    in_flight: &mut InFlight,
    evt_tx: &Sender<RuntimeEvent>,
) {
    match orchestrator.begin(key) {
        Begin::Cached { generation } => publish(orchestrator, generation, evt_tx),
        Begin::Pending(ticket) => {
            publish(orchestrator, ticket.generation(), evt_tx);
            let pipeline = orchestrator.pipeline();
            in_flight.push(
                async move {
                    let outcome = pipeline.execute(ticket.key()).await;
                    (ticket, outcome)
                }
                .boxed(),
            );
        }
    }
}

fn publish(orchestrator: &QueryOrchestrator, generation: u64, evt_tx: &Sender<RuntimeEvent>) {
    let _ = evt_tx.send(RuntimeEvent::QueryUpdated {
        generation,
        state: orchestrator.state().clone(),
        cached_queries: orchestrator.cache().len(),
    });
}
