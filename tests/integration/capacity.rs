//! Capacity accounting across a whole run.

use cellsim_chain::TransmissionOutcome;
use cellsim_core::{LinkDirection, SimTime};

use crate::infra::{metro_network, run_scenario};

#[test]
fn reservations_drain_to_zero_after_the_run() {
    let run = run_scenario(&format!(
        r#"
        [chain]
        min_share = 0.2
        {net}
        [[scenario.messages]]
        id = 1
        source = "veh_0"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 800
        inject_at_ns = 0

        [[scenario.messages]]
        id = 2
        source = "veh_1"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 800
        inject_at_ns = 0

        [[scenario.messages]]
        id = 3
        source = "veh_0"
        destination = {{ region = "metro" }}
        payload_bits = 100
        inject_at_ns = 3000000000
        "#,
        net = metro_network()
    ))
    .unwrap();

    let mut ids: Vec<u64> = run.outcomes.iter().map(|o| o.message_id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
    for direction in [LinkDirection::Uplink, LinkDirection::Downlink] {
        let snap = run.registry.snapshot("metro", direction).unwrap();
        assert_eq!(snap.reserved_bps, 0, "{direction:?} pool not drained");
    }
}

#[test]
fn base_delay_is_added_at_every_stream_stage() {
    // 500 ms base delay on both pools: each radio hop takes 1.5 s, and
    // the routing hop in between adds nothing.
    let run = run_scenario(
        r#"
        [[network.regions]]
        id = "metro"
        uplink = { capacity_bps = 1000, base_delay_ns = 500000000, target_delay_ns = 1000000000 }
        downlink = { capacity_bps = 2000, base_delay_ns = 500000000, target_delay_ns = 1000000000 }

        [network.endpoints]
        veh_0 = "metro"
        rsu_0 = "metro"

        [[scenario.messages]]
        id = 1
        source = "veh_0"
        destination = { endpoint = "rsu_0" }
        payload_bits = 400
        inject_at_ns = 0
        "#,
    )
    .unwrap();

    assert_eq!(
        run.outcomes,
        vec![TransmissionOutcome::Acknowledged {
            message_id: 1,
            completed_at: SimTime::from_secs(3),
        }]
    );
}
