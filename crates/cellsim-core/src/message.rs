//! Message and routing value types consumed by the transmission chain.
//!
//! A [`NetworkMessage`] is handed to the chain by the host runtime and is
//! never mutated — the chain wraps it in descriptors and records of its
//! own. Routing is fixed at message entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a simulated network endpoint (vehicle, roadside station, server).
pub type EndpointId = String;

/// Name of a network-capacity partition.
pub type RegionId = String;

/// Direction of a transmission relative to the radio access network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkDirection {
    Uplink,
    Downlink,
}

/// How a message is carried across the cellular network.
///
/// Fixed at message entry. Every message enters over the uplink towards
/// the core network; the Geocaster selects the downlink variant from the
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransmissionMode {
    UplinkUnicast,
    UplinkBroadcast,
    DownlinkUnicast,
    DownlinkBroadcast,
}

impl TransmissionMode {
    pub fn direction(self) -> LinkDirection {
        match self {
            TransmissionMode::UplinkUnicast | TransmissionMode::UplinkBroadcast => {
                LinkDirection::Uplink
            }
            TransmissionMode::DownlinkUnicast | TransmissionMode::DownlinkBroadcast => {
                LinkDirection::Downlink
            }
        }
    }

    pub fn is_broadcast(self) -> bool {
        matches!(
            self,
            TransmissionMode::UplinkBroadcast | TransmissionMode::DownlinkBroadcast
        )
    }
}

impl fmt::Display for TransmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransmissionMode::UplinkUnicast => "uplink-unicast",
            TransmissionMode::UplinkBroadcast => "uplink-broadcast",
            TransmissionMode::DownlinkUnicast => "downlink-unicast",
            TransmissionMode::DownlinkBroadcast => "downlink-broadcast",
        };
        f.write_str(name)
    }
}

/// Where a message is headed once it leaves the core network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// A single endpoint — delivered as downlink unicast.
    Endpoint(EndpointId),
    /// Every receiver in a region — delivered as downlink broadcast.
    Region(RegionId),
}

/// Routing descriptor fixed when the message enters the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRouting {
    pub source: EndpointId,
    pub destination: Destination,
}

/// Immutable data message travelling across the simulated network.
///
/// Owned by the originating federate; the chain only reads it. Payload
/// size is in bits, matching the bits/sec capacity accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMessage {
    pub id: u64,
    pub routing: MessageRouting,
    pub payload_bits: u64,
}

impl NetworkMessage {
    pub fn unicast(id: u64, source: impl Into<String>, destination: impl Into<String>, payload_bits: u64) -> Self {
        NetworkMessage {
            id,
            routing: MessageRouting {
                source: source.into(),
                destination: Destination::Endpoint(destination.into()),
            },
            payload_bits,
        }
    }

    pub fn broadcast(id: u64, source: impl Into<String>, region: impl Into<String>, payload_bits: u64) -> Self {
        NetworkMessage {
            id,
            routing: MessageRouting {
                source: source.into(),
                destination: Destination::Region(region.into()),
            },
            payload_bits,
        }
    }
}
