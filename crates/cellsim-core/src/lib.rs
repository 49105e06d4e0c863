//! cellsim-core — shared value types, simulation time, and configuration.
//! All other cellsim crates depend on this one.

pub mod config;
pub mod message;
pub mod time;

pub use message::{Destination, LinkDirection, MessageRouting, NetworkMessage, TransmissionMode};
pub use time::SimTime;
