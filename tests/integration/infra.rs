//! Shared harness: build a chain from a TOML scenario and run it dry.

use std::sync::Arc;

use anyhow::Result;

use cellsim_chain::{
    ChainEvent, ChainManager, ChainRunner, EventQueue, EventScheduler, RegionRegistry, RunStats,
    TransmissionOutcome,
};
use cellsim_core::config::CellConfig;
use cellsim_core::{MessageRouting, NetworkMessage, SimTime};

pub struct ScenarioRun {
    pub stats: RunStats,
    pub outcomes: Vec<TransmissionOutcome>,
    pub registry: Arc<RegionRegistry>,
}

/// Parse a scenario, inject its messages, and drain the queue.
///
/// Returns the dispatch error when a run aborts, so tests can assert on
/// structural failures as well as on outcomes.
pub fn run_scenario(toml: &str) -> Result<ScenarioRun> {
    let config = CellConfig::from_toml_str(toml)?;
    let registry = Arc::new(RegionRegistry::from_config(&config));
    let queue = Arc::new(EventQueue::new());
    let (manager, mut outcome_rx) =
        ChainManager::standard(registry.clone(), queue.clone(), config.chain.clone());

    for msg in &config.scenario.messages {
        let message = Arc::new(NetworkMessage {
            id: msg.id,
            routing: MessageRouting {
                source: msg.source.clone(),
                destination: msg.destination.clone(),
            },
            payload_bits: msg.payload_bits,
        });
        queue.schedule(ChainEvent::arrival(
            message,
            SimTime::from_nanos(msg.inject_at_ns),
        ))?;
    }

    let stats = ChainRunner::new(&queue, &manager).run()?;

    let mut outcomes = Vec::new();
    while let Ok(outcome) = outcome_rx.try_recv() {
        outcomes.push(outcome);
    }
    Ok(ScenarioRun {
        stats,
        outcomes,
        registry,
    })
}

/// One region, 1000 bps up / 2000 bps down, zero base delay, 1 s target
/// delay, one vehicle and one roadside unit mapped into it.
pub fn metro_network() -> &'static str {
    r#"
    [[network.regions]]
    id = "metro"
    uplink = { capacity_bps = 1000, base_delay_ns = 0, target_delay_ns = 1000000000 }
    downlink = { capacity_bps = 2000, base_delay_ns = 0, target_delay_ns = 1000000000 }

    [network.endpoints]
    veh_0 = "metro"
    veh_1 = "metro"
    rsu_0 = "metro"
    "#
}
