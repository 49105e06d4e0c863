//! Stream processor — pure admission decisions for one transmission.
//!
//! Given the transmission mode, the payload size, and a snapshot of the
//! region pool, decide how much bandwidth the message gets and how long
//! the transmission takes. Pure and deterministic: the same inputs
//! always yield the same decision, and no capacity is touched here —
//! reservation is the caller's job.

use cellsim_core::message::TransmissionMode;
use cellsim_core::time::NANOS_PER_SEC;
use cellsim_core::SimTime;
use serde::Serialize;

use crate::region::RegionSnapshot;

/// Admission outcome for one transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Full demanded bandwidth granted.
    Accepted { bandwidth_bps: u64, delay: SimTime },
    /// Partial grant: the pool cannot hold the full demand but at least
    /// the configured minimum share is free. The delay is strictly
    /// longer than the undegraded case.
    Degraded { bandwidth_bps: u64, delay: SimTime },
    /// No admissible grant.
    Rejected { reason: RejectReason },
}

impl Decision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Decision::Rejected { .. })
    }

    pub fn granted_bps(&self) -> Option<u64> {
        match self {
            Decision::Accepted { bandwidth_bps, .. } | Decision::Degraded { bandwidth_bps, .. } => {
                Some(*bandwidth_bps)
            }
            Decision::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// The pool has no free bandwidth at all.
    NoCapacity,
    /// Free bandwidth exists but is below the configured minimum share
    /// of the demand.
    BelowMinimumShare,
    /// The mode has no transmission path (uplink broadcast).
    ModeNotSupported,
}

/// Bandwidth a message demands: payload spread over the configured
/// target transmission time, at least 1 bps.
pub fn demanded_bandwidth(payload_bits: u64, target_delay: SimTime) -> u64 {
    let target_ns = target_delay.as_nanos().max(1);
    let bps = (payload_bits as u128 * NANOS_PER_SEC as u128) / target_ns as u128;
    (bps.min(u64::MAX as u128) as u64).max(1)
}

/// Time to push `payload_bits` through `bandwidth_bps`, rounded up.
fn transmission_time(payload_bits: u64, bandwidth_bps: u64) -> SimTime {
    let bw = bandwidth_bps.max(1) as u128;
    let ns = (payload_bits as u128 * NANOS_PER_SEC as u128 + bw - 1) / bw;
    SimTime::from_nanos(ns.min(u64::MAX as u128) as u64)
}

/// Decide admission for one transmission.
///
/// `min_share` is the fraction of the demanded bandwidth that must be
/// free for a degraded grant (validated into (0.0, 1.0] at config load).
/// Tie-break: a demand exactly equal to the free bandwidth is Accepted.
pub fn decide(
    mode: TransmissionMode,
    payload_bits: u64,
    snapshot: &RegionSnapshot,
    min_share: f64,
) -> Decision {
    if mode == TransmissionMode::UplinkBroadcast {
        return Decision::Rejected {
            reason: RejectReason::ModeNotSupported,
        };
    }

    let demanded = demanded_bandwidth(payload_bits, snapshot.target_delay);
    let free = snapshot.free_bps();

    if free == 0 {
        return Decision::Rejected {
            reason: RejectReason::NoCapacity,
        };
    }

    if demanded <= free {
        return Decision::Accepted {
            bandwidth_bps: demanded,
            delay: snapshot.base_delay + transmission_time(payload_bits, demanded),
        };
    }

    let min_needed = (demanded as f64 * min_share).ceil() as u64;
    if free >= min_needed.max(1) {
        return Decision::Degraded {
            bandwidth_bps: free,
            delay: snapshot.base_delay + transmission_time(payload_bits, free),
        };
    }

    Decision::Rejected {
        reason: RejectReason::BelowMinimumShare,
    }
}
