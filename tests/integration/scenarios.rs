//! End-to-end unicast scenarios through all three stages.

use cellsim_chain::{ModuleName, RejectReason, TransmissionOutcome};
use cellsim_core::SimTime;

use crate::infra::{metro_network, run_scenario};

#[test]
fn single_unicast_is_acknowledged() {
    // 400 bits against a 1 s target delay demands 400 bps. Both pools
    // have room, so each hop takes exactly one second.
    let run = run_scenario(&format!(
        r#"
        {net}
        [[scenario.messages]]
        id = 1
        source = "veh_0"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 400
        inject_at_ns = 0
        "#,
        net = metro_network()
    ))
    .unwrap();

    assert_eq!(
        run.outcomes,
        vec![TransmissionOutcome::Acknowledged {
            message_id: 1,
            completed_at: SimTime::from_secs(2),
        }]
    );
    // arrival + geocaster + downstream transmissions, two completions
    assert_eq!(run.stats.transmissions, 3);
    assert_eq!(run.stats.completions, 2);
    assert_eq!(run.stats.events_dispatched, 5);
}

#[test]
fn outcomes_serialize_to_snake_case_json() {
    // The runner prints one JSON object per outcome; the tag and field
    // names are part of that output contract.
    let run = run_scenario(&format!(
        r#"
        {net}
        [[scenario.messages]]
        id = 1
        source = "veh_0"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 400
        inject_at_ns = 0
        "#,
        net = metro_network()
    ))
    .unwrap();

    assert_eq!(
        serde_json::to_string(&run.outcomes[0]).unwrap(),
        r#"{"acknowledged":{"message_id":1,"completed_at":2000000000}}"#
    );
}

#[test]
fn released_capacity_admits_a_later_message() {
    // The first message fills the uplink until t=1s. The second arrives
    // at t=1.5s, after the release, and goes through at full rate.
    let run = run_scenario(&format!(
        r#"
        {net}
        [[scenario.messages]]
        id = 1
        source = "veh_0"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 1000
        inject_at_ns = 0

        [[scenario.messages]]
        id = 2
        source = "veh_1"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 1000
        inject_at_ns = 1500000000
        "#,
        net = metro_network()
    ))
    .unwrap();

    assert_eq!(
        run.outcomes,
        vec![
            TransmissionOutcome::Acknowledged {
                message_id: 1,
                completed_at: SimTime::from_secs(2),
            },
            TransmissionOutcome::Acknowledged {
                message_id: 2,
                completed_at: SimTime::from_millis(3500),
            },
        ]
    );
}

#[test]
fn contended_uplink_degrades_the_second_message() {
    // Two 800 bps demands against a 1000 bps uplink. The second gets
    // the 200 bps remainder (above the 0.2 minimum share) and takes
    // four seconds for its uplink hop instead of one.
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
        "#,
        net = metro_network()
    ))
    .unwrap();

    assert_eq!(
        run.outcomes,
        vec![
            TransmissionOutcome::Acknowledged {
                message_id: 1,
                completed_at: SimTime::from_secs(2),
            },
            TransmissionOutcome::Acknowledged {
                message_id: 2,
                completed_at: SimTime::from_secs(5),
            },
        ]
    );
}

#[test]
fn below_minimum_share_is_rejected_at_the_uplink() {
    // With min_share 0.5 the 200 bps remainder is not enough for the
    // second 800 bps demand, and the failure is reported immediately.
    let run = run_scenario(&format!(
        r#"
        [chain]
        min_share = 0.5
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
        "#,
        net = metro_network()
    ))
    .unwrap();

    assert_eq!(
        run.outcomes,
        vec![
            TransmissionOutcome::Failed {
                message_id: 2,
                stage: ModuleName::Upstream,
                reason: RejectReason::BelowMinimumShare,
            },
            TransmissionOutcome::Acknowledged {
                message_id: 1,
                completed_at: SimTime::from_secs(2),
            },
        ]
    );
}

#[test]
fn exhausted_pool_rejects_with_no_capacity() {
    let run = run_scenario(&format!(
        r#"
        {net}
        [[scenario.messages]]
        id = 1
        source = "veh_0"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 1000
        inject_at_ns = 0

        [[scenario.messages]]
        id = 2
        source = "veh_1"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 100
        inject_at_ns = 0
        "#,
        net = metro_network()
    ))
    .unwrap();

    assert_eq!(
        run.outcomes[0],
        TransmissionOutcome::Failed {
            message_id: 2,
            stage: ModuleName::Upstream,
            reason: RejectReason::NoCapacity,
        }
    );
}

#[test]
fn downlink_rejection_reports_the_downstream_stage() {
    // Wide uplink, narrow downlink, degradation disabled: the message
    // clears the uplink and fails on the receiver side.
    let run = run_scenario(
        r#"
        [chain]
        min_share = 1.0

        [[network.regions]]
        id = "metro"
        uplink = { capacity_bps = 4000, base_delay_ns = 0, target_delay_ns = 1000000000 }
        downlink = { capacity_bps = 1000, base_delay_ns = 0, target_delay_ns = 1000000000 }

        [network.endpoints]
        veh_0 = "metro"
        rsu_0 = "metro"

        [[scenario.messages]]
        id = 1
        source = "veh_0"
        destination = { endpoint = "rsu_0" }
        payload_bits = 1500
        inject_at_ns = 0
        "#,
    )
    .unwrap();

    assert_eq!(
        run.outcomes,
        vec![TransmissionOutcome::Failed {
            message_id: 1,
            stage: ModuleName::Downstream,
            reason: RejectReason::BelowMinimumShare,
        }]
    );
}

#[test]
fn unknown_source_endpoint_aborts_the_run() {
    let result = run_scenario(&format!(
        r#"
        {net}
        [[scenario.messages]]
        id = 1
        source = "ghost"
        destination = {{ endpoint = "rsu_0" }}
        payload_bits = 400
        inject_at_ns = 0
        "#,
        net = metro_network()
    ));
    assert!(result.is_err());
}
