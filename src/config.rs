//! Configuration for replacement policies.
//!
//! This module defines the configuration surface of the library. It provides:
//! 1. **Defaults:** Baseline constants matching common hardware choices
//!    (2-bit RRPV, 3-bit SHCT counters, 3% bimodal throttle).
//! 2. **Enums:** Policy selection and signature derivation source.
//! 3. **Validation:** One-shot construction-time checking; invalid
//!    parameters are a fatal configuration error, never a runtime one.
//!
//! Configuration is supplied via JSON from an outer driver or use
//! `PolicyConfig::default()` directly.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants.
///
/// These values define the baseline policy parameters when not explicitly
/// overridden in the supplied configuration.
mod defaults {
    /// Default RRPV width in bits (2 bits: values 0..=3).
    ///
    /// A width of 1 degenerates to NRU; 2 is the usual RRIP operating point.
    pub const RRPV_BITS: u32 = 2;

    /// Default SHCT entry width in bits (3 bits: values 0..=7).
    pub const SHCT_BITS: u32 = 3;

    /// Default bimodal throttle percentage.
    ///
    /// Percentage of insertions forced to the distant re-reference position
    /// regardless of prediction, keeping stale signature history from
    /// pinning the cache.
    pub const BTP: u32 = 3;

    /// Default hit promotion mode (true = Hit Priority).
    pub const HIT_PRIORITY: bool = true;
}

/// Replacement policy selection.
///
/// Specifies the algorithm used to select which cache line to evict when a
/// new line must be installed in a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyKind {
    /// Least Recently Used replacement.
    ///
    /// Evicts the line that was accessed least recently.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Random replacement.
    ///
    /// Evicts a pseudo-randomly selected line from the set.
    #[serde(alias = "Random")]
    Random,
    /// Re-Reference Interval Prediction (bimodal RRIP).
    ///
    /// Ages lines with a per-line saturating counter; inserts most lines at
    /// the distant position so single-use lines drain quickly.
    #[serde(alias = "Rrip")]
    Rrip,
    /// Signature-based Hit Prediction (SHiP).
    ///
    /// RRIP aging plus a global table that learns, per address or PC
    /// signature, whether past insertions were reused before eviction.
    #[serde(alias = "Ship")]
    Ship,
}

/// Source value for SHiP signature derivation.
///
/// Selects what the caller passes to `reset` and how it is folded down to
/// a table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SignatureSource {
    /// Signature is the low bits of the memory address.
    ///
    /// Deliberately cheap; exploits spatial locality of reuse.
    #[default]
    Address,
    /// Signature is an XOR-fold of the originating program counter.
    ///
    /// Instruction addresses cluster in their low bits, so they are spread
    /// across the full table by folding.
    #[serde(alias = "PC")]
    Pc,
}

/// Configuration error raised during policy construction.
///
/// All variants are fatal: the parameters are fixed at construction and
/// never re-validated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// RRPV width outside the storable range.
    #[error("num_rrpv_bits must be in [1, 31], got {0}")]
    RrpvBits(u32),
    /// SHCT entry width outside the storable range.
    #[error("num_shct_bits must be in [1, 31], got {0}")]
    ShctBits(u32),
    /// Bimodal throttle outside the percentage range.
    #[error("btp must be a percentage in [0, 100], got {0}")]
    Btp(u32),
}

/// Replacement policy configuration.
///
/// Fixed at construction and immutable thereafter. Fields irrelevant to
/// the selected policy (e.g. `num_shct_bits` under LRU) are ignored.
///
/// # Examples
///
/// Deserializing from JSON (typical driver usage):
///
/// ```
/// use cache_replacement::config::{PolicyConfig, PolicyKind, SignatureSource};
///
/// let json = r#"{
///     "kind": "SHIP",
///     "num_rrpv_bits": 2,
///     "num_shct_bits": 3,
///     "signature_source": "Pc",
///     "hit_priority": true,
///     "btp": 3
/// }"#;
///
/// let config: PolicyConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.kind, PolicyKind::Ship);
/// assert_eq!(config.signature_source, SignatureSource::Pc);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Which replacement algorithm to build.
    #[serde(default)]
    pub kind: PolicyKind,

    /// Width of the per-line re-reference prediction value, in bits.
    #[serde(default = "PolicyConfig::default_rrpv_bits")]
    pub num_rrpv_bits: u32,

    /// Width of each signature history counter, in bits.
    #[serde(default = "PolicyConfig::default_shct_bits")]
    pub num_shct_bits: u32,

    /// What `reset` receives as the signature source value.
    #[serde(default)]
    pub signature_source: SignatureSource,

    /// Hit promotion mode: true promotes straight to RRPV 0 on a hit
    /// (Hit Priority), false steps down by one (Frequency Priority).
    #[serde(default = "PolicyConfig::default_hit_priority")]
    pub hit_priority: bool,

    /// Bimodal throttle: percentage of insertions forced to the distant
    /// position even when prediction favors retention.
    #[serde(default = "PolicyConfig::default_btp")]
    pub btp: u32,
}

impl PolicyConfig {
    /// Returns the default RRPV width.
    fn default_rrpv_bits() -> u32 {
        defaults::RRPV_BITS
    }

    /// Returns the default SHCT entry width.
    fn default_shct_bits() -> u32 {
        defaults::SHCT_BITS
    }

    /// Returns the default hit promotion mode.
    fn default_hit_priority() -> bool {
        defaults::HIT_PRIORITY
    }

    /// Returns the default bimodal throttle percentage.
    fn default_btp() -> u32 {
        defaults::BTP
    }

    /// Validates all parameters.
    ///
    /// Counter widths must fit the `u32` counter storage and `btp` must be
    /// a percentage. Called by the policy factory; callers constructing
    /// policies directly should call it themselves.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a [`ConfigError`].
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.num_rrpv_bits < 1 || self.num_rrpv_bits > 31 {
            return Err(ConfigError::RrpvBits(self.num_rrpv_bits));
        }
        if self.num_shct_bits < 1 || self.num_shct_bits > 31 {
            return Err(ConfigError::ShctBits(self.num_shct_bits));
        }
        if self.btp > 100 {
            return Err(ConfigError::Btp(self.btp));
        }
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            kind: PolicyKind::default(),
            num_rrpv_bits: defaults::RRPV_BITS,
            num_shct_bits: defaults::SHCT_BITS,
            signature_source: SignatureSource::default(),
            hit_priority: defaults::HIT_PRIORITY,
            btp: defaults::BTP,
        }
    }
}
