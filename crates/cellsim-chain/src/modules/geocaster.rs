//! Geocaster — core-network routing between uplink and downlink.
//!
//! Picks the downlink mode from the message's destination and hands the
//! message to the Downstream stage. Routing happens inside the core
//! network and consumes no radio capacity, so the Geocaster never holds
//! a reservation and never schedules completion events for itself.

use std::sync::Arc;

use cellsim_core::message::Destination;
use cellsim_core::{SimTime, TransmissionMode};

use super::{ChainContext, ChainModule};
use crate::error::ChainError;
use crate::event::{ChainEvent, ChainPayload, ModuleName, TransmissionDescriptor};
use crate::region::RegionError;

pub struct GeocasterModule {
    ctx: Arc<ChainContext>,
}

impl GeocasterModule {
    pub fn new(ctx: Arc<ChainContext>) -> Self {
        GeocasterModule { ctx }
    }

    fn route(&self, desc: TransmissionDescriptor, at: SimTime) -> Result<(), ChainError> {
        let mode = match &desc.message.routing.destination {
            Destination::Endpoint(_) => TransmissionMode::DownlinkUnicast,
            Destination::Region(region) => {
                // A broadcast into a region nobody configured is a model
                // inconsistency, not a transmission failure.
                if !self.ctx.registry.has_region(region) {
                    return Err(RegionError::UnknownRegion(region.clone()).into());
                }
                TransmissionMode::DownlinkBroadcast
            }
        };

        tracing::debug!(
            message_id = desc.message.id,
            %mode,
            destination = ?desc.message.routing.destination,
            "geocaster routed message"
        );

        let next = TransmissionDescriptor {
            message: Arc::clone(&desc.message),
            mode,
            granted_bps: desc.granted_bps,
            entered_at: desc.entered_at,
        };
        self.ctx.scheduler.schedule(ChainEvent {
            target: ModuleName::Downstream,
            time: at,
            payload: ChainPayload::Transmission(next),
        })
    }
}

impl ChainModule for GeocasterModule {
    fn name(&self) -> ModuleName {
        ModuleName::Geocaster
    }

    fn handle(&self, event: ChainEvent) -> Result<(), ChainError> {
        match event.payload {
            ChainPayload::Transmission(desc) => self.route(desc, event.time),
            ChainPayload::Completion(_) => {
                Err(ChainError::UnsupportedPayload(ModuleName::Geocaster))
            }
        }
    }
}
