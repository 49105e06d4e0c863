//! Events, descriptors, and per-message records flowing through the chain.
//!
//! Ownership rule: an event is owned by the scheduler from creation to
//! dispatch, then handed to the addressed module. A transmission record
//! rides inside the module's own completion event, so the reservation it
//! holds is released exactly once — when that event fires — and the
//! module that emitted a continuation never touches the message again.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use cellsim_core::message::RegionId;
use cellsim_core::{NetworkMessage, SimTime, TransmissionMode};

use crate::region::ReservationHandle;
use crate::stream::RejectReason;

/// The three stages of the transmission chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModuleName {
    Upstream,
    Geocaster,
    Downstream,
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleName::Upstream => "upstream",
            ModuleName::Geocaster => "geocaster",
            ModuleName::Downstream => "downstream",
        };
        f.write_str(name)
    }
}

/// A message in flight between stages.
#[derive(Debug, Clone)]
pub struct TransmissionDescriptor {
    pub message: Arc<NetworkMessage>,
    pub mode: TransmissionMode,
    /// Bandwidth granted by the previous stage, if any.
    pub granted_bps: Option<u64>,
    /// When the message entered the chain.
    pub entered_at: SimTime,
}

impl TransmissionDescriptor {
    /// Descriptor for a message newly entering the chain. The uplink is
    /// always unicast: every cellular message goes through the Geocaster.
    pub fn arrival(message: Arc<NetworkMessage>, at: SimTime) -> Self {
        TransmissionDescriptor {
            message,
            mode: TransmissionMode::UplinkUnicast,
            granted_bps: None,
            entered_at: at,
        }
    }
}

/// Per-message chain-lifetime state while a reservation is held.
///
/// Created when a stream module reserves bandwidth; destroyed when its
/// completion event fires and the reservation is released.
#[derive(Debug)]
pub struct TransmissionRecord {
    pub message_id: u64,
    pub module: ModuleName,
    pub region: RegionId,
    pub reservation: ReservationHandle,
    pub started_at: SimTime,
    pub delay: SimTime,
}

/// Event payload: a message to transmit or a self-addressed cleanup.
#[derive(Debug)]
pub enum ChainPayload {
    Transmission(TransmissionDescriptor),
    Completion(TransmissionRecord),
}

/// The scheduling unit of the chain.
#[derive(Debug)]
pub struct ChainEvent {
    pub target: ModuleName,
    pub time: SimTime,
    pub payload: ChainPayload,
}

impl ChainEvent {
    /// Entry point event: a new message arriving at the Upstream stage.
    pub fn arrival(message: Arc<NetworkMessage>, at: SimTime) -> Self {
        ChainEvent {
            target: ModuleName::Upstream,
            time: at,
            payload: ChainPayload::Transmission(TransmissionDescriptor::arrival(message, at)),
        }
    }
}

/// Terminal notification handed back to the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionOutcome {
    Acknowledged {
        message_id: u64,
        completed_at: SimTime,
    },
    Failed {
        message_id: u64,
        stage: ModuleName,
        reason: RejectReason,
    },
}

impl TransmissionOutcome {
    pub fn message_id(&self) -> u64 {
        match self {
            TransmissionOutcome::Acknowledged { message_id, .. }
            | TransmissionOutcome::Failed { message_id, .. } => *message_id,
        }
    }
}
