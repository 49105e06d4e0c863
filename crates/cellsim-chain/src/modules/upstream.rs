//! Upstream — the uplink half of the radio access network.
//!
//! First module in the chain. Every cellular message enters here on its
//! way to the Geocaster, and the uplink always bases on unicast: there
//! is no broadcast path towards the core network.

use std::sync::Arc;

use cellsim_core::{SimTime, TransmissionMode};

use super::{admit_and_reserve, free_bandwidth, Admission, ChainContext, ChainModule};
use crate::error::ChainError;
use crate::event::{
    ChainEvent, ChainPayload, ModuleName, TransmissionDescriptor, TransmissionRecord,
};

pub struct UpstreamModule {
    ctx: Arc<ChainContext>,
}

impl UpstreamModule {
    pub fn new(ctx: Arc<ChainContext>) -> Self {
        UpstreamModule { ctx }
    }

    fn process_message(
        &self,
        desc: TransmissionDescriptor,
        start: SimTime,
    ) -> Result<(), ChainError> {
        let mode = TransmissionMode::UplinkUnicast;
        let region = self
            .ctx
            .registry
            .resolve_region(&desc.message.routing.source)?;

        match admit_and_reserve(&self.ctx, ModuleName::Upstream, &region, &desc.message, mode)? {
            Admission::Refused { reason } => {
                self.ctx
                    .report_failure(desc.message.id, ModuleName::Upstream, reason);
                Ok(())
            }
            Admission::Granted {
                reservation,
                bandwidth_bps,
                delay,
            } => {
                let finished = start + delay;
                let record = TransmissionRecord {
                    message_id: desc.message.id,
                    module: ModuleName::Upstream,
                    region,
                    reservation,
                    started_at: start,
                    delay,
                };
                self.ctx.scheduler.schedule(ChainEvent {
                    target: ModuleName::Upstream,
                    time: finished,
                    payload: ChainPayload::Completion(record),
                })?;

                // The message reaches the Geocaster once the uplink
                // transmission finishes.
                let next = TransmissionDescriptor {
                    message: Arc::clone(&desc.message),
                    mode,
                    granted_bps: Some(bandwidth_bps),
                    entered_at: desc.entered_at,
                };
                self.ctx.scheduler.schedule(ChainEvent {
                    target: ModuleName::Geocaster,
                    time: finished,
                    payload: ChainPayload::Transmission(next),
                })?;
                Ok(())
            }
        }
    }
}

impl ChainModule for UpstreamModule {
    fn name(&self) -> ModuleName {
        ModuleName::Upstream
    }

    fn handle(&self, event: ChainEvent) -> Result<(), ChainError> {
        match event.payload {
            ChainPayload::Transmission(desc) => self.process_message(desc, event.time),
            ChainPayload::Completion(mut record) => {
                free_bandwidth(&self.ctx, &mut record);
                Ok(())
            }
        }
    }
}
