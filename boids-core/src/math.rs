//! Minimal 2D vector math.
//!
//! All transcendental functions go through `libm` so the engine behaves the same with and
//! without `std` (and on every target).

use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// z component of the 3D cross product; positive when `rhs` is counter-clockwise of `self`.
    #[inline]
    pub fn perp_dot(self, rhs: Self) -> f32 {
        self.x * rhs.y - self.y * rhs.x
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        libm::sqrtf(self.length_squared())
    }

    #[inline]
    pub fn distance(self, rhs: Self) -> f32 {
        (self - rhs).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Unit vector in the same direction, or zero when the length is zero or not finite.
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            self / len
        } else {
            Self::ZERO
        }
    }

    /// Shorten to at most `max`. Never lengthens.
    pub fn clamp_length_max(self, max: f32) -> Self {
        let len_sq = self.length_squared();
        if len_sq > max * max {
            self.normalize_or_zero() * max
        } else {
            self
        }
    }

    /// Scale so the length lies in `[min, max]`. The zero vector has no direction and stays zero.
    pub fn clamp_length(self, min: f32, max: f32) -> Self {
        let len_sq = self.length_squared();
        if len_sq == 0.0 {
            self
        } else if len_sq < min * min {
            self.normalize_or_zero() * min
        } else if len_sq > max * max {
            self.normalize_or_zero() * max
        } else {
            self
        }
    }

    /// Component-wise clamp.
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self::new(self.x.clamp(min.x, max.x), self.y.clamp(min.y, max.y))
    }

    /// Signed angle in radians from `self` to `rhs`, in `(-PI, PI]`.
    pub fn angle_to(self, rhs: Self) -> f32 {
        libm::atan2f(self.perp_dot(rhs), self.dot(rhs))
    }

    /// Rotate by a unit direction (complex multiplication). `Vec2::Y.rotate_to(d) == d`.
    pub fn rotate_to(self, direction: Self) -> Self {
        // Rotation that maps +Y onto `direction` has cos = d.y, sin = -d.x.
        let (cos, sin) = (direction.y, -direction.x);
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// `f32::signum` without `std`: `+1.0` for `+0.0`, `-1.0` for `-0.0`.
#[inline]
pub fn signum(v: f32) -> f32 {
    if v.is_nan() { v } else { libm::copysignf(1.0, v) }
}

/// `f32::powf` without `std`.
#[inline]
pub fn powf(base: f32, exp: f32) -> f32 {
    libm::powf(base, exp)
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}
