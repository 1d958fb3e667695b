//! Configuration errors.
//!
//! The simulation path itself has no recoverable errors. Everything that can
//! go wrong is caught when a [`MovementConfig`](crate::config::MovementConfig)
//! is validated or when a character is activated, and is fatal for that
//! character.

use thiserror::Error;

/// Reasons a movement configuration or character setup is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A tunable that must be strictly positive is zero, negative or NaN.
    #[error("`{field}` must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A tunable that may be zero is negative or NaN.
    #[error("`{field}` must be non-negative and finite, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A normalized tunable is outside `0.0..=1.0`.
    #[error("`{field}` must be within 0.0..=1.0, got {value}")]
    OutOfUnitRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A tunable is NaN or infinite.
    #[error("`{field}` must be finite, got {value}")]
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// Raw jump fields changed without recomputing the derived kinematics.
    #[error("derived jump kinematics are out of date")]
    StaleDerived,

    /// At least one jump must be allowed.
    #[error("`jumps_allowed` must be at least 1")]
    NoJumpsAllowed,

    /// A collision layer mask has no bits set, so casts could never hit.
    #[error("layer mask `{0}` is empty")]
    EmptyLayerMask(&'static str),

    /// The character has no usable collision shape to probe from.
    #[error("character has no collision bounds")]
    MissingBounds,

    /// TOML source could not be parsed into a config.
    #[error("failed to parse movement config: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
