//! Configuration for the cell network model.
//!
//! Loaded from TOML. Every field has a default so a minimal scenario
//! file only names its regions and endpoints. Region properties are
//! static for the duration of a run — the chain treats them as a
//! read-only lookup after load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::message::Destination;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    pub chain: ChainSettings,
    pub network: NetworkSettings,
    pub scenario: ScenarioSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Fraction of the requested bandwidth that must still be free for a
    /// degraded grant. 1.0 disables degradation entirely (full rate or
    /// nothing).
    pub min_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Capacity regions. Region ids must be unique.
    pub regions: Vec<RegionSettings>,
    /// Endpoint name → region id. Endpoints not listed here fall back to
    /// `base_region` when one is configured.
    pub endpoints: HashMap<String, String>,
    /// Catch-all region for endpoints without an explicit assignment.
    pub base_region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    pub id: String,
    pub uplink: PoolSettings,
    pub downlink: PoolSettings,
}

/// One direction of a region's radio capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Total capacity in bits/sec.
    pub capacity_bps: u64,
    /// Fixed propagation/processing delay added to every transmission.
    pub base_delay_ns: u64,
    /// Target transmission time. Bandwidth demand for a message is
    /// payload size divided by this value.
    pub target_delay_ns: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSettings {
    /// Messages injected by the scenario runner. Empty for library use.
    pub messages: Vec<ScenarioMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMessage {
    pub id: u64,
    pub source: String,
    pub destination: Destination,
    pub payload_bits: u64,
    /// Simulation time at which the message enters the chain.
    pub inject_at_ns: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            chain: ChainSettings::default(),
            network: NetworkSettings::default(),
            scenario: ScenarioSettings::default(),
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self { min_share: 0.5 }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            endpoints: HashMap::new(),
            base_region: None,
        }
    }
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            id: String::new(),
            uplink: PoolSettings::default(),
            downlink: PoolSettings::default(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            capacity_bps: 10_000_000,           // 10 Mbit/s
            base_delay_ns: 20_000_000,          // 20 ms
            target_delay_ns: 200_000_000,       // 200 ms
        }
    }
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to parse config: {0}")]
    ParseStrFailed(toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl CellConfig {
    /// Load and validate a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        let config: CellConfig =
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CellConfig = toml::from_str(text).map_err(ConfigError::ParseStrFailed)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that TOML parsing cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chain.min_share > 0.0 && self.chain.min_share <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "chain.min_share must be in (0.0, 1.0], got {}",
                self.chain.min_share
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for region in &self.network.regions {
            if region.id.is_empty() {
                return Err(ConfigError::Invalid("region with empty id".to_string()));
            }
            if !seen.insert(region.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate region id {:?}",
                    region.id
                )));
            }
            for (direction, pool) in [("uplink", &region.uplink), ("downlink", &region.downlink)] {
                if pool.capacity_bps == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "region {:?} {direction} capacity must be > 0",
                        region.id
                    )));
                }
                if pool.target_delay_ns == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "region {:?} {direction} target_delay_ns must be > 0",
                        region.id
                    )));
                }
            }
        }

        if let Some(base) = &self.network.base_region {
            if !seen.contains(base.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "base_region {base:?} is not a configured region"
                )));
            }
        }
        for (endpoint, region) in &self.network.endpoints {
            if !seen.contains(region.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "endpoint {endpoint:?} assigned to unknown region {region:?}"
                )));
            }
        }
        Ok(())
    }
}
