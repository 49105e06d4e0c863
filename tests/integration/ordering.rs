//! Event-time ordering across the chain stages.

use std::sync::Arc;

use cellsim_chain::{
    ChainEvent, ChainManager, ChainPayload, EventQueue, EventScheduler, ModuleName, RegionRegistry,
};
use cellsim_core::config::CellConfig;
use cellsim_core::{NetworkMessage, SimTime};

use crate::infra::metro_network;

#[test]
fn continuations_never_precede_their_producing_event() {
    // Step the queue by hand so every dispatched event's time is
    // visible: each continuation is scheduled while its producer is
    // being dispatched, so a monotone dispatch sequence means no stage
    // ever hands a message backwards in time.
    let config = CellConfig::from_toml_str(metro_network()).unwrap();
    let registry = Arc::new(RegionRegistry::from_config(&config));
    let queue = Arc::new(EventQueue::new());
    let (manager, _outcomes) =
        ChainManager::standard(registry, queue.clone(), config.chain.clone());

    queue
        .schedule(ChainEvent::arrival(
            Arc::new(NetworkMessage::unicast(1, "veh_0", "rsu_0", 400)),
            SimTime::ZERO,
        ))
        .unwrap();

    let mut stages = Vec::new();
    let mut last = SimTime::ZERO;
    while let Some(event) = queue.pop_next() {
        assert!(
            event.time >= last,
            "event for {} at {} after clock reached {last}",
            event.target,
            event.time
        );
        last = event.time;
        if let ChainPayload::Transmission(_) = event.payload {
            stages.push((event.target, event.time));
        }
        manager.dispatch(event).unwrap();
    }

    let (names, times): (Vec<_>, Vec<_>) = stages.into_iter().unzip();
    assert_eq!(
        names,
        vec![
            ModuleName::Upstream,
            ModuleName::Geocaster,
            ModuleName::Downstream,
        ]
    );
    assert!(times[1] >= times[0], "geocaster hop went backwards");
    assert!(times[2] >= times[1], "downstream hop went backwards");
}
