//! Chain modules — one stage of the transmission chain each.
//!
//! Modules are a small closed set of event handlers behind one trait,
//! selected by name through the manager's registry. The Upstream and
//! Downstream stages are stream modules: they admit a message against a
//! region pool, hold a reservation for the transmission duration, and
//! free it through a self-addressed completion event. The Geocaster is
//! the routing hop between them and consumes no radio capacity.

mod downstream;
mod geocaster;
mod upstream;

pub use downstream::DownstreamModule;
pub use geocaster::GeocasterModule;
pub use upstream::UpstreamModule;

use std::sync::Arc;
use tokio::sync::mpsc;

use cellsim_core::config::ChainSettings;
use cellsim_core::{NetworkMessage, SimTime, TransmissionMode};

use crate::error::ChainError;
use crate::event::{ChainEvent, ModuleName, TransmissionOutcome, TransmissionRecord};
use crate::region::{RegionError, RegionRegistry, ReservationHandle};
use crate::scheduler::EventScheduler;
use crate::stream::{self, Decision, RejectReason};

/// One stage of the chain. Handlers run to completion and never block;
/// anything deferred goes back through the scheduler.
pub trait ChainModule: Send + Sync {
    fn name(&self) -> ModuleName;

    fn handle(&self, event: ChainEvent) -> Result<(), ChainError>;
}

/// Shared handles every module needs: the capacity registry, the host
/// scheduler, and the outcome channel back to the originating federate.
pub struct ChainContext {
    pub registry: Arc<RegionRegistry>,
    pub scheduler: Arc<dyn EventScheduler>,
    pub outcomes: mpsc::UnboundedSender<TransmissionOutcome>,
    pub settings: ChainSettings,
}

impl ChainContext {
    pub fn acknowledge(&self, message_id: u64, completed_at: SimTime) {
        tracing::debug!(message_id, %completed_at, "transmission acknowledged");
        let outcome = TransmissionOutcome::Acknowledged {
            message_id,
            completed_at,
        };
        if self.outcomes.send(outcome).is_err() {
            tracing::warn!(message_id, "outcome receiver dropped, acknowledgment lost");
        }
    }

    pub fn report_failure(&self, message_id: u64, stage: ModuleName, reason: RejectReason) {
        tracing::debug!(message_id, %stage, ?reason, "transmission failed");
        let outcome = TransmissionOutcome::Failed {
            message_id,
            stage,
            reason,
        };
        if self.outcomes.send(outcome).is_err() {
            tracing::warn!(message_id, "outcome receiver dropped, failure report lost");
        }
    }
}

/// Result of one admission attempt at a stream module.
pub(crate) enum Admission {
    Granted {
        reservation: ReservationHandle,
        bandwidth_bps: u64,
        delay: SimTime,
    },
    Refused {
        reason: RejectReason,
    },
}

/// Admit a message against one region pool and reserve the grant.
///
/// The decision and the reservation are not atomic: a concurrent
/// reservation can consume the capacity in between. That race is
/// resolved by re-deciding once against the then-current pool state
/// before giving up.
pub(crate) fn admit_and_reserve(
    ctx: &ChainContext,
    module: ModuleName,
    region: &str,
    message: &NetworkMessage,
    mode: TransmissionMode,
) -> Result<Admission, ChainError> {
    let direction = mode.direction();
    for attempt in 0..2 {
        let snapshot = ctx.registry.snapshot(region, direction)?;
        let decision = stream::decide(
            mode,
            message.payload_bits,
            &snapshot,
            ctx.settings.min_share,
        );

        let (bandwidth_bps, delay) = match decision {
            Decision::Rejected { reason } => return Ok(Admission::Refused { reason }),
            Decision::Accepted {
                bandwidth_bps,
                delay,
            }
            | Decision::Degraded {
                bandwidth_bps,
                delay,
            } => (bandwidth_bps, delay),
        };

        match ctx.registry.reserve(region, direction, bandwidth_bps) {
            Ok(reservation) => {
                tracing::debug!(
                    message_id = message.id,
                    %module,
                    region,
                    ?direction,
                    bandwidth_bps,
                    %delay,
                    "bandwidth reserved"
                );
                return Ok(Admission::Granted {
                    reservation,
                    bandwidth_bps,
                    delay,
                });
            }
            Err(RegionError::CapacityExceeded { .. }) if attempt == 0 => {
                // Lost the race between decision and reservation.
                tracing::debug!(
                    message_id = message.id,
                    %module,
                    region,
                    "reservation raced, re-deciding"
                );
            }
            Err(RegionError::CapacityExceeded { .. }) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Admission::Refused {
        reason: RejectReason::NoCapacity,
    })
}

/// Release the reservation carried by a completion event.
///
/// Completion events are never cancelled, so this is the single place a
/// reservation is returned to its pool. A double release here is a
/// module logic bug; in release builds it is logged and treated as
/// already released.
pub(crate) fn free_bandwidth(ctx: &ChainContext, record: &mut TransmissionRecord) {
    match ctx.registry.release(&mut record.reservation) {
        Ok(()) => tracing::trace!(
            message_id = record.message_id,
            module = %record.module,
            region = %record.region,
            "reservation released"
        ),
        Err(e) => tracing::error!(
            message_id = record.message_id,
            module = %record.module,
            error = %e,
            "double release ignored"
        ),
    }
}
