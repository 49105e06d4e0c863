//! cellsim-chain — the cellular transmission chain.
//!
//! A message travels Upstream → Geocaster → Downstream as discrete
//! events against the shared simulation clock. The Upstream and
//! Downstream stages admit the message against per-region bandwidth
//! pools and hold a reservation for the duration of the transmission;
//! the Geocaster routes between them. Terminal outcomes (acknowledgment
//! or failure) flow back to the host runtime over a channel.

pub mod error;
pub mod event;
pub mod manager;
pub mod modules;
pub mod region;
pub mod scheduler;
pub mod stream;

pub use error::ChainError;
pub use event::{
    ChainEvent, ChainPayload, ModuleName, TransmissionDescriptor, TransmissionOutcome,
    TransmissionRecord,
};
pub use manager::ChainManager;
pub use modules::{ChainContext, ChainModule};
pub use region::{RegionError, RegionRegistry, RegionSnapshot, ReservationHandle};
pub use scheduler::{ChainRunner, EventQueue, EventScheduler, RunStats};
pub use stream::{Decision, RejectReason};
