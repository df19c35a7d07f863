//! Browser bindings for the boids simulation.
//!
//! `build-*.sh` compile this crate for `wasm32-unknown-unknown` and run wasm-bindgen with
//! `--target web --out-name boids`, producing `boids.js` + `boids_bg.wasm`.
//!
//! # Quick Start (JavaScript)
//!
//! ```js
//! import init, { Simulation } from "./boids.js";
//!
//! await init();
//! const sim = new Simulation(canvas.width, canvas.height);
//! const ctx = canvas.getContext("2d");
//!
//! function frame(now) {
//!   sim.tick(now);
//!   const image = new ImageData(new Uint8ClampedArray(sim.pixels()), sim.width(), sim.height());
//!   ctx.putImageData(image, 0, 0);
//!   requestAnimationFrame(frame);
//! }
//! requestAnimationFrame(frame);
//! ```

pub mod session;
mod utils;

use wasm_bindgen::prelude::*;

use boids_core::Parameters;

use crate::session::Session;
use crate::utils::{console_error, console_log, set_panic_hook};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Called automatically when the WASM module is loaded.
#[wasm_bindgen(start)]
pub fn init() {
    set_panic_hook();
    console_log(concat!("boids ", env!("CARGO_PKG_VERSION"), " loaded"));
}

/// Stringify any displayable error for JS.
fn js_err(e: impl core::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn random_seed() -> Result<u64, JsValue> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(js_err)?;
    Ok(u64::from_le_bytes(buf))
}

/// A running flock plus its framebuffer.
#[wasm_bindgen]
pub struct Simulation {
    session: Session,
}

#[wasm_bindgen]
impl Simulation {
    /// Spawn the default flock on a `width` x `height` canvas.
    ///
    /// Without `seed` the RNG is seeded from the browser's crypto source.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, seed: Option<u64>) -> Result<Simulation, JsValue> {
        let seed = match seed {
            Some(seed) => seed,
            None => random_seed()?,
        };
        let session = Session::new(width, height, seed).map_err(js_err)?;
        Ok(Self { session })
    }

    /// Advance to the `requestAnimationFrame` timestamp and redraw.
    pub fn tick(&mut self, now_ms: f64) -> Result<(), JsValue> {
        if let Err(e) = self.session.tick(now_ms) {
            console_error(&e.to_string());
            return Err(js_err(e));
        }
        if cfg!(debug_assertions) {
            if let Some(fps) = self.session.take_frame_rate() {
                console_log(&format!("{fps:.1} fps, {} boids", self.session.flock().len()));
            }
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.session.resize(width, height)
    }

    /// Pointer position in canvas pixels and `MouseEvent.buttons`.
    pub fn pointer(&mut self, x: f32, y: f32, buttons: u32) {
        self.session.pointer(x, y, buttons);
    }

    #[wasm_bindgen(js_name = "pointerLeave")]
    pub fn pointer_leave(&mut self) {
        self.session.pointer_leave();
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    /// Set one parameter by its snake_case name. Throws on unknown names and invalid values.
    #[wasm_bindgen(js_name = "setParam")]
    pub fn set_param(&mut self, name: &str, value: f32) -> Result<(), JsValue> {
        self.session.set_param(name, value).map_err(js_err)
    }

    pub fn param(&self, name: &str) -> Result<f32, JsValue> {
        self.session.param(name).map_err(js_err)
    }

    /// All parameters as a plain object.
    pub fn params(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.session.params()).map_err(js_err)
    }

    /// Replace the parameters from a (possibly partial) object. The window size is kept.
    #[wasm_bindgen(js_name = "setParams")]
    pub fn set_params(&mut self, value: JsValue) -> Result<(), JsValue> {
        let params: Parameters = serde_wasm_bindgen::from_value(value).map_err(js_err)?;
        self.session.set_params(params).map_err(js_err)
    }

    /// `{ count, mean_speed, polarization, centroid: { x, y } }`
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.stats()).map_err(js_err)
    }

    pub fn width(&self) -> u32 {
        self.session.frame().width()
    }

    pub fn height(&self) -> u32 {
        self.session.frame().height()
    }

    /// RGBA bytes of the last frame, ready for `ImageData`.
    pub fn pixels(&self) -> Vec<u8> {
        self.session.frame().to_rgba()
    }
}
