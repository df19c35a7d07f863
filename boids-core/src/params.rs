//! Simulation parameters.
//!
//! `Parameters` is the single configuration type of the simulation. Hosts tune it at runtime
//! through [`ParamKey`] (sliders in the page, `--set` on the CLI) or replace it wholesale from a
//! serialized config.

use core::fmt;
use core::ops::{Range, RangeInclusive};
use core::str::FromStr;

use alloc::string::ToString;

use crate::error::ParamError;
use crate::math::Vec2;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Parameters {
    pub window_width: f32,
    pub window_height: f32,
    pub number_of_boids: usize,
    pub view_distance: f32,

    pub cohesion_force: f32,
    pub separation_force: f32,
    pub separation_bias: f32,
    pub alignment_bias: f32,
    pub alignment_force: f32,
    pub steering_force: f32,

    /// Probability that a pair of boids is considered in a given frame.
    pub fidelity: f32,

    pub min_speed: f32,
    pub max_speed: f32,

    pub bounce_off_walls: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            window_width: 100.0,
            window_height: 100.0,
            number_of_boids: 512,
            view_distance: 75.0,
            cohesion_force: 2.5,
            separation_force: 1.8,
            separation_bias: 1.1,
            alignment_force: 1.1,
            alignment_bias: 1.5,
            steering_force: 0.8,
            fidelity: 0.9,
            min_speed: 25.0,
            max_speed: 100.0,
            bounce_off_walls: false,
        }
    }
}

impl Parameters {
    /// Valid x coordinates for the current window.
    pub fn window_x_range(&self) -> Range<f32> {
        -self.window_width / 2.0..self.window_width / 2.0
    }

    /// Valid y coordinates for the current window.
    pub fn window_y_range(&self) -> Range<f32> {
        -self.window_height / 2.0..self.window_height / 2.0
    }

    /// Top-right corner of the window.
    pub fn max_position(&self) -> Vec2 {
        Vec2::new(self.window_width / 2.0, self.window_height / 2.0)
    }

    /// Bottom-left corner of the window.
    pub fn min_position(&self) -> Vec2 {
        Vec2::new(-self.window_width / 2.0, -self.window_height / 2.0)
    }

    /// Current value of a tunable parameter. Booleans read as `0.0` / `1.0`.
    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::NumberOfBoids => self.number_of_boids as f32,
            ParamKey::ViewDistance => self.view_distance,
            ParamKey::CohesionForce => self.cohesion_force,
            ParamKey::SeparationForce => self.separation_force,
            ParamKey::SeparationBias => self.separation_bias,
            ParamKey::AlignmentForce => self.alignment_force,
            ParamKey::AlignmentBias => self.alignment_bias,
            ParamKey::SteeringForce => self.steering_force,
            ParamKey::Fidelity => self.fidelity,
            ParamKey::MinSpeed => self.min_speed,
            ParamKey::MaxSpeed => self.max_speed,
            ParamKey::BounceOffWalls => {
                if self.bounce_off_walls {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Allowed bounds of `key` given the rest of the parameters.
    ///
    /// The speed pair depends on each other: `min_speed` may not exceed `max_speed`.
    pub fn bounds(&self, key: ParamKey) -> (f32, f32) {
        let range = key.range();
        match key {
            ParamKey::MinSpeed => (*range.start(), self.max_speed.min(*range.end())),
            ParamKey::MaxSpeed => (self.min_speed.max(*range.start()), *range.end()),
            _ => (*range.start(), *range.end()),
        }
    }

    /// Update one parameter, rejecting non-finite and out-of-range values.
    pub fn set(&mut self, key: ParamKey, value: f32) -> Result<(), ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite { key, value });
        }
        let value = match key {
            ParamKey::NumberOfBoids => libm::roundf(value),
            _ => value,
        };
        let (min, max) = self.bounds(key);
        if value < min || value > max {
            return Err(ParamError::OutOfRange {
                key,
                value,
                min,
                max,
            });
        }

        match key {
            ParamKey::NumberOfBoids => self.number_of_boids = value as usize,
            ParamKey::ViewDistance => self.view_distance = value,
            ParamKey::CohesionForce => self.cohesion_force = value,
            ParamKey::SeparationForce => self.separation_force = value,
            ParamKey::SeparationBias => self.separation_bias = value,
            ParamKey::AlignmentForce => self.alignment_force = value,
            ParamKey::AlignmentBias => self.alignment_bias = value,
            ParamKey::SteeringForce => self.steering_force = value,
            ParamKey::Fidelity => self.fidelity = value,
            ParamKey::MinSpeed => self.min_speed = value,
            ParamKey::MaxSpeed => self.max_speed = value,
            ParamKey::BounceOffWalls => self.bounce_off_walls = value != 0.0,
        }
        Ok(())
    }

    /// Check a whole parameter set, e.g. one loaded from a config file.
    pub fn validate(&self) -> Result<(), ParamError> {
        self.validate_window()?;
        for key in ParamKey::ALL {
            self.check(key)?;
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), but accepts any population size.
    pub(crate) fn validate_dynamics(&self) -> Result<(), ParamError> {
        self.validate_window()?;
        for key in ParamKey::ALL {
            if key != ParamKey::NumberOfBoids {
                self.check(key)?;
            }
        }
        Ok(())
    }

    fn validate_window(&self) -> Result<(), ParamError> {
        let (width, height) = (self.window_width, self.window_height);
        if !window_has_area(width, height) {
            return Err(ParamError::EmptyWindow { width, height });
        }
        Ok(())
    }

    fn check(&self, key: ParamKey) -> Result<(), ParamError> {
        let value = self.get(key);
        if !value.is_finite() {
            return Err(ParamError::NotFinite { key, value });
        }
        let (min, max) = self.bounds(key);
        if value < min || value > max {
            return Err(ParamError::OutOfRange {
                key,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Both half-extents must be positive: spawning samples from `-w/2..w/2`, which is empty for
/// subnormal sizes.
pub(crate) fn window_has_area(width: f32, height: f32) -> bool {
    width.is_finite() && height.is_finite() && width / 2.0 > 0.0 && height / 2.0 > 0.0
}

/// Named handle for every tunable parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ParamKey {
    NumberOfBoids,
    ViewDistance,
    CohesionForce,
    SeparationForce,
    SeparationBias,
    AlignmentForce,
    AlignmentBias,
    SteeringForce,
    Fidelity,
    MinSpeed,
    MaxSpeed,
    BounceOffWalls,
}

impl ParamKey {
    pub const ALL: [ParamKey; 12] = [
        ParamKey::NumberOfBoids,
        ParamKey::ViewDistance,
        ParamKey::CohesionForce,
        ParamKey::SeparationForce,
        ParamKey::SeparationBias,
        ParamKey::AlignmentForce,
        ParamKey::AlignmentBias,
        ParamKey::SteeringForce,
        ParamKey::Fidelity,
        ParamKey::MinSpeed,
        ParamKey::MaxSpeed,
        ParamKey::BounceOffWalls,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ParamKey::NumberOfBoids => "number_of_boids",
            ParamKey::ViewDistance => "view_distance",
            ParamKey::CohesionForce => "cohesion_force",
            ParamKey::SeparationForce => "separation_force",
            ParamKey::SeparationBias => "separation_bias",
            ParamKey::AlignmentForce => "alignment_force",
            ParamKey::AlignmentBias => "alignment_bias",
            ParamKey::SteeringForce => "steering_force",
            ParamKey::Fidelity => "fidelity",
            ParamKey::MinSpeed => "min_speed",
            ParamKey::MaxSpeed => "max_speed",
            ParamKey::BounceOffWalls => "bounce_off_walls",
        }
    }

    /// Static slider range. The speed pair is further constrained by [`Parameters::bounds`].
    pub const fn range(self) -> RangeInclusive<f32> {
        match self {
            ParamKey::NumberOfBoids => 8.0..=2048.0,
            ParamKey::ViewDistance => 0.0..=500.0,
            ParamKey::CohesionForce => 0.0..=100.0,
            ParamKey::SeparationForce => 0.0..=100.0,
            ParamKey::SeparationBias => 0.01..=10.0,
            ParamKey::AlignmentForce => 0.0..=100.0,
            ParamKey::AlignmentBias => 0.01..=100.0,
            ParamKey::SteeringForce => 0.0..=100.0,
            ParamKey::Fidelity => 0.01..=1.0,
            ParamKey::MinSpeed => 10.0..=500.0,
            ParamKey::MaxSpeed => 10.0..=500.0,
            ParamKey::BounceOffWalls => 0.0..=1.0,
        }
    }

    /// Whether a slider for this key should use a logarithmic scale.
    pub const fn logarithmic(self) -> bool {
        matches!(
            self,
            ParamKey::NumberOfBoids
                | ParamKey::CohesionForce
                | ParamKey::SeparationForce
                | ParamKey::SeparationBias
                | ParamKey::AlignmentForce
                | ParamKey::AlignmentBias
                | ParamKey::SteeringForce
        )
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = ParamError;

    /// Accepts the snake_case name; `-` is treated as `_` and case is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ParamKey::ALL
            .into_iter()
            .find(|key| name_matches(s, key.as_str()))
            .ok_or_else(|| ParamError::UnknownKey(s.to_string()))
    }
}

fn name_matches(input: &str, name: &str) -> bool {
    input.len() == name.len()
        && input.bytes().zip(name.bytes()).all(|(a, b)| {
            let a = if a == b'-' { b'_' } else { a.to_ascii_lowercase() };
            a == b
        })
}
