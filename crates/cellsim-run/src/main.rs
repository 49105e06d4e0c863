//! cellsim — scenario runner for the cellular transmission chain.
//!
//! Loads a TOML scenario, injects its messages into the chain, drains
//! the event queue to completion, and prints one JSON outcome per
//! message followed by a run summary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use cellsim_chain::{
    ChainEvent, ChainManager, ChainRunner, EventQueue, EventScheduler, RegionRegistry,
    TransmissionOutcome,
};
use cellsim_core::config::CellConfig;
use cellsim_core::{MessageRouting, NetworkMessage, SimTime};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scenario.toml".to_string());
    tracing::info!(path, "loading scenario");
    let config = CellConfig::from_file(&path).with_context(|| format!("loading {path}"))?;

    let registry = Arc::new(RegionRegistry::from_config(&config));
    let queue = Arc::new(EventQueue::new());
    let (manager, mut outcome_rx) =
        ChainManager::standard(registry, queue.clone(), config.chain.clone());

    for msg in &config.scenario.messages {
        let message = Arc::new(NetworkMessage {
            id: msg.id,
            routing: MessageRouting {
                source: msg.source.clone(),
                destination: msg.destination.clone(),
            },
            payload_bits: msg.payload_bits,
        });
        let at = SimTime::from_nanos(msg.inject_at_ns);
        queue
            .schedule(ChainEvent::arrival(message, at))
            .with_context(|| format!("injecting message {}", msg.id))?;
    }
    tracing::info!(
        messages = config.scenario.messages.len(),
        "scenario injected"
    );

    let runner = ChainRunner::new(&queue, &manager);
    let stats = runner.run()?;

    print_outcomes(&mut outcome_rx)?;
    tracing::info!(
        events = stats.events_dispatched,
        transmissions = stats.transmissions,
        completions = stats.completions,
        "run finished"
    );
    Ok(())
}

fn print_outcomes(rx: &mut mpsc::UnboundedReceiver<TransmissionOutcome>) -> Result<()> {
    while let Ok(outcome) = rx.try_recv() {
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}
