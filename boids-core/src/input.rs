//! Pointer input.
//!
//! Hosts report the pointer in screen pixels (origin top-left, y down) together with a button
//! bitmask. The bit layout matches DOM `MouseEvent.buttons`, so the page can forward it as-is.
//!
//! - primary button held: boids within reach steer towards the pointer
//! - secondary button held: boids within reach steer away from it
//! - nothing held: no effect

use crate::math::Vec2;

/// Pointer button bitmask.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PointerButtons {
    Primary = 1 << 0,
    Secondary = 1 << 1,
    Auxiliary = 1 << 2,
}

impl PointerButtons {
    #[inline]
    pub const fn is_set(self, mask: u32) -> bool {
        mask & (self as u32) != 0
    }
}

/// What the pointer does to nearby boids this frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PointerAction {
    Attract,
    Repel,
}

impl PointerAction {
    /// Sign applied to the steering target.
    pub const fn direction(self) -> f32 {
        match self {
            PointerAction::Attract => 1.0,
            PointerAction::Repel => -1.0,
        }
    }
}

/// Pointer snapshot in world coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pointer {
    pub position: Vec2,
    pub buttons: u32,
}

impl Pointer {
    pub const fn new(position: Vec2, buttons: u32) -> Self {
        Self { position, buttons }
    }

    /// Build from screen pixels of a `width` x `height` view.
    pub fn from_screen(x: f32, y: f32, width: f32, height: f32, buttons: u32) -> Self {
        Self::new(screen_to_world(x, y, width, height), buttons)
    }

    /// Primary wins when both buttons are held.
    pub fn action(&self) -> Option<PointerAction> {
        if PointerButtons::Primary.is_set(self.buttons) {
            Some(PointerAction::Attract)
        } else if PointerButtons::Secondary.is_set(self.buttons) {
            Some(PointerAction::Repel)
        } else {
            None
        }
    }
}

/// Map top-left-origin screen pixels onto the centered, y-up world.
pub fn screen_to_world(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(x - width / 2.0, height / 2.0 - y)
}

/// Inverse of [`screen_to_world`].
pub fn world_to_screen(p: Vec2, width: f32, height: f32) -> (f32, f32) {
    (p.x + width / 2.0, height / 2.0 - p.y)
}
