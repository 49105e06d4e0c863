//! Region capacity registry — per-region bandwidth pools.
//!
//! A region is a capacity partition of the radio network with separate
//! uplink and downlink pools. Reservations and releases on one region
//! are serialized (the map entry is locked while mutated); distinct
//! regions mutate independently. Invariant: `reserved ≤ capacity` per
//! pool at all times.

use dashmap::DashMap;
use std::collections::HashMap;

use cellsim_core::config::CellConfig;
use cellsim_core::message::{EndpointId, RegionId};
use cellsim_core::{LinkDirection, SimTime};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("no region registered for endpoint {0:?}")]
    UnknownEndpoint(EndpointId),

    #[error("unknown region {0:?}")]
    UnknownRegion(RegionId),

    #[error("region {region:?} {direction:?} pool exhausted: requested {requested_bps} bps, {free_bps} bps free")]
    CapacityExceeded {
        region: RegionId,
        direction: LinkDirection,
        requested_bps: u64,
        free_bps: u64,
    },

    #[error("reservation of {bits_per_sec} bps in region {region:?} released twice")]
    DoubleRelease { region: RegionId, bits_per_sec: u64 },
}

impl RegionError {
    /// Structural errors abort the run; the rest resolve per-message.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RegionError::UnknownEndpoint(_) | RegionError::UnknownRegion(_)
        )
    }
}

/// Read-only view of one pool, input to the stream processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSnapshot {
    pub capacity_bps: u64,
    pub reserved_bps: u64,
    pub base_delay: SimTime,
    pub target_delay: SimTime,
}

impl RegionSnapshot {
    pub fn free_bps(&self) -> u64 {
        self.capacity_bps.saturating_sub(self.reserved_bps)
    }
}

/// Proof of a live reservation. Held inside the transmission record and
/// handed back to [`RegionRegistry::release`] exactly once.
#[derive(Debug)]
pub struct ReservationHandle {
    region: RegionId,
    direction: LinkDirection,
    bits_per_sec: u64,
    released: bool,
}

impl ReservationHandle {
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn direction(&self) -> LinkDirection {
        self.direction
    }

    pub fn bits_per_sec(&self) -> u64 {
        self.bits_per_sec
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[derive(Debug)]
struct PoolState {
    capacity_bps: u64,
    reserved_bps: u64,
    base_delay: SimTime,
    target_delay: SimTime,
}

impl PoolState {
    fn snapshot(&self) -> RegionSnapshot {
        RegionSnapshot {
            capacity_bps: self.capacity_bps,
            reserved_bps: self.reserved_bps,
            base_delay: self.base_delay,
            target_delay: self.target_delay,
        }
    }
}

#[derive(Debug)]
struct RegionState {
    uplink: PoolState,
    downlink: PoolState,
}

impl RegionState {
    fn pool(&self, direction: LinkDirection) -> &PoolState {
        match direction {
            LinkDirection::Uplink => &self.uplink,
            LinkDirection::Downlink => &self.downlink,
        }
    }

    fn pool_mut(&mut self, direction: LinkDirection) -> &mut PoolState {
        match direction {
            LinkDirection::Uplink => &mut self.uplink,
            LinkDirection::Downlink => &mut self.downlink,
        }
    }
}

/// Owns every region's capacity state and the endpoint→region map.
///
/// Modules hold only [`ReservationHandle`]s; all mutation goes through
/// `reserve`/`release` here. The endpoint map is static after load.
pub struct RegionRegistry {
    regions: DashMap<RegionId, RegionState>,
    endpoints: HashMap<EndpointId, RegionId>,
    base_region: Option<RegionId>,
}

impl RegionRegistry {
    /// Build the registry from a validated config.
    pub fn from_config(config: &CellConfig) -> Self {
        let regions = DashMap::new();
        for settings in &config.network.regions {
            regions.insert(
                settings.id.clone(),
                RegionState {
                    uplink: PoolState {
                        capacity_bps: settings.uplink.capacity_bps,
                        reserved_bps: 0,
                        base_delay: SimTime::from_nanos(settings.uplink.base_delay_ns),
                        target_delay: SimTime::from_nanos(settings.uplink.target_delay_ns),
                    },
                    downlink: PoolState {
                        capacity_bps: settings.downlink.capacity_bps,
                        reserved_bps: 0,
                        base_delay: SimTime::from_nanos(settings.downlink.base_delay_ns),
                        target_delay: SimTime::from_nanos(settings.downlink.target_delay_ns),
                    },
                },
            );
        }
        RegionRegistry {
            regions,
            endpoints: config.network.endpoints.clone(),
            base_region: config.network.base_region.clone(),
        }
    }

    /// Which region an endpoint transmits in. Falls back to the base
    /// region when the endpoint has no explicit assignment.
    pub fn resolve_region(&self, endpoint: &str) -> Result<RegionId, RegionError> {
        if let Some(region) = self.endpoints.get(endpoint) {
            return Ok(region.clone());
        }
        self.base_region
            .clone()
            .ok_or_else(|| RegionError::UnknownEndpoint(endpoint.to_string()))
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    /// Current state of one pool, for the stream processor.
    pub fn snapshot(
        &self,
        region: &str,
        direction: LinkDirection,
    ) -> Result<RegionSnapshot, RegionError> {
        let state = self
            .regions
            .get(region)
            .ok_or_else(|| RegionError::UnknownRegion(region.to_string()))?;
        Ok(state.pool(direction).snapshot())
    }

    /// Atomically reserve bandwidth in one pool.
    ///
    /// Fails with `CapacityExceeded` and no side effect when the pool
    /// cannot hold the full amount.
    pub fn reserve(
        &self,
        region: &str,
        direction: LinkDirection,
        bits_per_sec: u64,
    ) -> Result<ReservationHandle, RegionError> {
        let mut state = self
            .regions
            .get_mut(region)
            .ok_or_else(|| RegionError::UnknownRegion(region.to_string()))?;
        let pool = state.pool_mut(direction);
        let free = pool.capacity_bps.saturating_sub(pool.reserved_bps);
        if bits_per_sec == 0 || bits_per_sec > free {
            return Err(RegionError::CapacityExceeded {
                region: region.to_string(),
                direction,
                requested_bps: bits_per_sec,
                free_bps: free,
            });
        }
        pool.reserved_bps += bits_per_sec;
        Ok(ReservationHandle {
            region: region.to_string(),
            direction,
            bits_per_sec,
            released: false,
        })
    }

    /// Return reserved bandwidth to the pool.
    ///
    /// Guarded against double release: the second call on the same handle
    /// reports `DoubleRelease` and leaves the pool untouched, so
    /// `reserved` can never go negative. A double release is a module
    /// logic bug — fatal under debug assertions, logged by the caller in
    /// release builds.
    pub fn release(&self, handle: &mut ReservationHandle) -> Result<(), RegionError> {
        if handle.released {
            debug_assert!(
                false,
                "reservation in region {:?} released twice",
                handle.region
            );
            return Err(RegionError::DoubleRelease {
                region: handle.region.clone(),
                bits_per_sec: handle.bits_per_sec,
            });
        }
        handle.released = true;
        if let Some(mut state) = self.regions.get_mut(&handle.region) {
            let pool = state.pool_mut(handle.direction);
            pool.reserved_bps = pool.reserved_bps.saturating_sub(handle.bits_per_sec);
        }
        Ok(())
    }
}
