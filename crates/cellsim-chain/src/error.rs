//! Error taxonomy for the transmission chain.
//!
//! Two classes with different propagation:
//!
//! - Structural errors ([`ChainError`]) mean the model itself is
//!   inconsistent — an event addressed to a module nobody registered, an
//!   endpoint with no region, an event scheduled into the past. They
//!   propagate out of `dispatch` and terminate the run; continuing would
//!   corrupt the capacity accounting.
//! - Per-message capacity exhaustion ([`RegionError::CapacityExceeded`])
//!   never escapes the module that hit it. It ends that message's state
//!   machine and surfaces only as a failure report to the originator.

use crate::event::ModuleName;
use crate::region::RegionError;
use cellsim_core::SimTime;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("event addresses unregistered module {0}")]
    UnknownModule(ModuleName),

    #[error("event for {module} scheduled at {scheduled} before current time {now}")]
    PastScheduling {
        module: ModuleName,
        scheduled: SimTime,
        now: SimTime,
    },

    #[error("module {0} received an event payload it cannot handle")]
    UnsupportedPayload(ModuleName),

    #[error(transparent)]
    Region(#[from] RegionError),
}
