//! A single boid and its per-frame scratch state.

use crate::math::Vec2;

/// Base half-size of a boid triangle, scaled by weight.
pub const BIRD_SIZE: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Boid {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Unit direction the triangle points at. Follows the velocity in [`Flock::fly`](crate::Flock::fly).
    pub heading: Vec2,
    /// Heavier boids are drawn larger and pull harder on their neighbours.
    pub weight: f32,
    /// Colour hue in degrees.
    pub hue: f32,
}

impl Boid {
    pub fn new(position: Vec2, velocity: Vec2, weight: f32) -> Self {
        Self {
            position,
            velocity,
            heading: Vec2::Y,
            weight,
            hue: 0.0,
        }
    }

    pub fn size(&self) -> f32 {
        BIRD_SIZE * self.weight
    }

    /// Triangle corners in world space: tip first, then the two tail corners.
    pub fn triangle(&self) -> [Vec2; 3] {
        let size = self.size();
        [
            Vec2::Y * size * 2.0,
            Vec2::new(-size, -size),
            Vec2::new(size, -size),
        ]
        .map(|corner| corner.rotate_to(self.heading) + self.position)
    }
}

/// Neighbour sums gathered during [`Flock::flock`](crate::Flock::flock).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Calculations {
    pub neighbours: u32,
    pub cohesion: Vec2,
    pub separation: Vec2,
    pub alignment: Vec2,
}

impl Calculations {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
