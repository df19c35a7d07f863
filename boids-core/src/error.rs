//! Error types for the flocking engine.

use alloc::string::String;
use thiserror::Error;

use crate::params::ParamKey;

/// A parameter update or a loaded configuration was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// The name does not match any [`ParamKey`].
    #[error("unknown parameter `{0}`")]
    UnknownKey(String),

    /// NaN or infinite input.
    #[error("{key} must be a finite number, got {value}")]
    NotFinite { key: ParamKey, value: f32 },

    /// Outside the key's allowed range.
    #[error("{key} must be within {min}..={max}, got {value}")]
    OutOfRange {
        key: ParamKey,
        value: f32,
        min: f32,
        max: f32,
    },

    /// The window has no area.
    #[error("window must have a positive size, got {width}x{height}")]
    EmptyWindow { width: f32, height: f32 },
}

/// Building a [`Flock`](crate::Flock) failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlockError {
    #[error(transparent)]
    Params(#[from] ParamError),

    /// The boid weight distribution could not be constructed.
    #[error("invalid weight distribution")]
    WeightDistribution,
}

/// A frame could not be advanced.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum StepError {
    #[error("frame delta must be finite and non-negative, got {0}")]
    InvalidDelta(f32),
}
