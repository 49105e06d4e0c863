//! Downstream — the downlink half of the radio access network.
//!
//! Terminal stage of the chain. Admits the message against the receiver
//! region's downlink pool (unicast: the region of the destination
//! endpoint; broadcast: the destination region, charged once for all
//! receivers) and acknowledges to the originator when the transmission
//! completes.

use std::sync::Arc;

use cellsim_core::message::{Destination, RegionId};
use cellsim_core::SimTime;

use super::{admit_and_reserve, free_bandwidth, Admission, ChainContext, ChainModule};
use crate::error::ChainError;
use crate::event::{ChainEvent, ChainPayload, ModuleName, TransmissionDescriptor, TransmissionRecord};
use crate::region::RegionError;

pub struct DownstreamModule {
    ctx: Arc<ChainContext>,
}

impl DownstreamModule {
    pub fn new(ctx: Arc<ChainContext>) -> Self {
        DownstreamModule { ctx }
    }

    fn receiver_region(&self, desc: &TransmissionDescriptor) -> Result<RegionId, ChainError> {
        match &desc.message.routing.destination {
            Destination::Endpoint(endpoint) => Ok(self.ctx.registry.resolve_region(endpoint)?),
            Destination::Region(region) => {
                if !self.ctx.registry.has_region(region) {
                    return Err(RegionError::UnknownRegion(region.clone()).into());
                }
                Ok(region.clone())
            }
        }
    }

    fn process_message(
        &self,
        desc: TransmissionDescriptor,
        start: SimTime,
    ) -> Result<(), ChainError> {
        let region = self.receiver_region(&desc)?;

        match admit_and_reserve(
            &self.ctx,
            ModuleName::Downstream,
            &region,
            &desc.message,
            desc.mode,
        )? {
            Admission::Refused { reason } => {
                self.ctx
                    .report_failure(desc.message.id, ModuleName::Downstream, reason);
                Ok(())
            }
            Admission::Granted {
                reservation, delay, ..
            } => {
                let record = TransmissionRecord {
                    message_id: desc.message.id,
                    module: ModuleName::Downstream,
                    region,
                    reservation,
                    started_at: start,
                    delay,
                };
                // Terminal stage: the completion notice both frees the
                // reservation and triggers the acknowledgment.
                self.ctx.scheduler.schedule(ChainEvent {
                    target: ModuleName::Downstream,
                    time: start + delay,
                    payload: ChainPayload::Completion(record),
                })
            }
        }
    }
}

impl ChainModule for DownstreamModule {
    fn name(&self) -> ModuleName {
        ModuleName::Downstream
    }

    fn handle(&self, event: ChainEvent) -> Result<(), ChainError> {
        match event.payload {
            ChainPayload::Transmission(desc) => self.process_message(desc, event.time),
            ChainPayload::Completion(mut record) => {
                free_bandwidth(&self.ctx, &mut record);
                self.ctx.acknowledge(record.message_id, event.time);
                Ok(())
            }
        }
    }
}
