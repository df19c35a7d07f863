#![cfg_attr(not(feature = "std"), no_std)]

//! boids-core: the flocking engine behind the boids simulation.
//!
//! This crate is shared by:
//! - `boids`: the wasm-bindgen module the build scripts compile to `wasm32-unknown-unknown`.
//! - `boids-cli`: a headless native driver that can export frames.
//!
//! Frame model:
//! - The host owns the clock and the pointer; it calls [`Flock::step`] once per frame.
//! - The flock owns every boid plus a seeded RNG, so a given seed replays identically.
//! - Drawing is done on the CPU into a [`Framebuffer`] that any host can blit.
//!
//! World coordinates are centered on the window with y pointing up.

#[cfg(not(feature = "std"))]
extern crate alloc;

// `alloc::` paths resolve to the std re-exports when std is on.
#[cfg(feature = "std")]
extern crate std as alloc;

pub mod boid;
pub mod error;
pub mod flock;
pub mod input;
pub mod math;
pub mod params;
pub mod render;

pub use boid::{Boid, Calculations};
pub use error::{FlockError, ParamError, StepError};
pub use flock::{Flock, FlockStats};
pub use input::{Pointer, PointerAction, PointerButtons};
pub use math::Vec2;
pub use params::{ParamKey, Parameters};
pub use render::Framebuffer;

/// Convenience prelude for hosts.
pub mod prelude {
    pub use crate::Boid;
    pub use crate::Flock;
    pub use crate::FlockStats;
    pub use crate::Framebuffer;
    pub use crate::ParamKey;
    pub use crate::Parameters;
    pub use crate::Pointer;
    pub use crate::Vec2;
    pub use crate::render::draw_flock;
}
