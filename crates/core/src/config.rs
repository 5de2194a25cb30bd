//! Configuration for the two-level cache hierarchy.
//!
//! This module defines the configuration structures and enums used to
//! parameterize a simulation run. It provides:
//! 1. **Defaults:** Baseline geometry constants for both cache levels.
//! 2. **Structures:** The flat five-field layout the original JSON
//!    configuration files use, with field aliases for their spelling.
//! 3. **Validation:** Width and associativity checks, rejected with
//!    [`ConfigError`] before any cache is built.
//!
//! Configuration is supplied as JSON (see [`SimConfig::from_json`]) or via
//! `SimConfig::default()`.

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants.
///
/// These values describe a small hierarchy that exercises both levels on
/// short traces; real runs are expected to supply a configuration file.
mod defaults {
    /// L1 set-index width (16 sets).
    pub const L1_SET_BITS: u32 = 4;

    /// L1 associativity (2 ways per set).
    pub const L1_WAYS: usize = 2;

    /// Block-offset width shared by both levels (16-byte blocks).
    pub const BLOCK_BITS: u32 = 4;

    /// L2 set-index width (16 sets).
    pub const L2_SET_BITS: u32 = 4;

    /// L2 associativity (4 ways per set).
    pub const L2_WAYS: usize = 4;
}

/// Victim-selection strategy, chosen once per run for both levels.
///
/// The two strategies share the same selection rule (evict the line with
/// the minimum usage counter, ties to the lowest way) but maintain the
/// counter differently: recency stamps a per-set clock, frequency counts
/// touches per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Least Recently Used: evict the line untouched for the longest time.
    #[default]
    #[serde(alias = "LRU")]
    Lru,
    /// Least Frequently Used: evict the line with the fewest touches.
    #[serde(alias = "LFU")]
    Lfu,
}

/// Complete simulation configuration.
///
/// The flat integer layout mirrors the JSON configuration files consumed
/// by the original tool, e.g.:
///
/// ```
/// use cachetrace_core::config::SimConfig;
///
/// let json = r#"{
///     "L1_setBits": 2,
///     "L1_ways": 2,
///     "blockBits": 4,
///     "L2_setBits": 3,
///     "L2_ways": 4
/// }"#;
///
/// let config = SimConfig::from_json(json).unwrap();
/// assert_eq!(config.l1_set_bits, 2);
/// assert_eq!(config.l2_ways, 4);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// L1 set-index width in bits (`2^n` sets).
    #[serde(alias = "L1_setBits", default = "SimConfig::default_l1_set_bits")]
    pub l1_set_bits: u32,

    /// L1 ways per set.
    #[serde(alias = "L1_ways", default = "SimConfig::default_l1_ways")]
    pub l1_ways: usize,

    /// Block-offset width in bits, shared by both levels.
    #[serde(alias = "blockBits", default = "SimConfig::default_block_bits")]
    pub block_bits: u32,

    /// L2 set-index width in bits (`2^n` sets).
    #[serde(alias = "L2_setBits", default = "SimConfig::default_l2_set_bits")]
    pub l2_set_bits: u32,

    /// L2 ways per set.
    #[serde(alias = "L2_ways", default = "SimConfig::default_l2_ways")]
    pub l2_ways: usize,

    /// Victim-selection strategy for both levels.
    #[serde(default)]
    pub policy: PolicyKind,
}

impl SimConfig {
    /// Returns the default L1 set-index width.
    fn default_l1_set_bits() -> u32 {
        defaults::L1_SET_BITS
    }

    /// Returns the default L1 associativity.
    fn default_l1_ways() -> usize {
        defaults::L1_WAYS
    }

    /// Returns the default block-offset width.
    fn default_block_bits() -> u32 {
        defaults::BLOCK_BITS
    }

    /// Returns the default L2 set-index width.
    fn default_l2_set_bits() -> u32 {
        defaults::L2_SET_BITS
    }

    /// Returns the default L2 associativity.
    fn default_l2_ways() -> usize {
        defaults::L2_WAYS
    }

    /// Parses a JSON configuration document and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that both levels describe a buildable cache.
    ///
    /// Rejects a level whose block-offset and set-index bits together
    /// exceed the 64-bit address width, and any level with zero ways.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (level, set_bits, ways) in [
            ("L1", self.l1_set_bits, self.l1_ways),
            ("L2", self.l2_set_bits, self.l2_ways),
        ] {
            if self.block_bits.checked_add(set_bits).is_none_or(|total| total > u64::BITS) {
                return Err(ConfigError::WidthExceeded {
                    level: level.to_string(),
                    block_bits: self.block_bits,
                    set_bits,
                });
            }
            if ways == 0 {
                return Err(ConfigError::NoWays {
                    level: level.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            l1_set_bits: defaults::L1_SET_BITS,
            l1_ways: defaults::L1_WAYS,
            block_bits: defaults::BLOCK_BITS,
            l2_set_bits: defaults::L2_SET_BITS,
            l2_ways: defaults::L2_WAYS,
            policy: PolicyKind::default(),
        }
    }
}
