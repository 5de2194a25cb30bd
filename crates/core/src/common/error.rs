//! Error types surfaced by cache construction and configuration.

use thiserror::Error;

/// Rejected cache configuration.
///
/// Construction-time failures only: a cache that passes validation cannot
/// fail at access time. Internal contract violations (allocating into a
/// full set, breaking the exclusive property) are programming errors and
/// assert instead of returning a variant here.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Block-offset plus set-index bits do not fit in a 64-bit address.
    #[error(
        "{level}: block bits ({block_bits}) + set bits ({set_bits}) exceed the 64-bit address width"
    )]
    WidthExceeded {
        /// Cache level the widths were configured for.
        level: String,
        /// Configured block-offset width.
        block_bits: u32,
        /// Configured set-index width.
        set_bits: u32,
    },

    /// A cache level was configured with zero ways.
    #[error("{level}: a set must hold at least one way")]
    NoWays {
        /// Cache level with the invalid associativity.
        level: String,
    },

    /// The configuration document could not be deserialized.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}
