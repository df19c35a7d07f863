//! Host-independent state behind the JS `Simulation` class.
//!
//! The page drives a [`Session`] from `requestAnimationFrame`: pointer events update the
//! pointer, each animation frame calls [`Session::tick`] with the frame timestamp, then blits
//! [`Session::frame`].

use boids_core::prelude::*;
use boids_core::{FlockError, ParamError, StepError};

/// Longest frame we simulate. Background tabs resume with a huge gap otherwise.
pub const MAX_DT: f32 = 0.25;

/// Frames between two frame-rate reports.
pub const FPS_WINDOW: u32 = 120;

pub struct Session {
    flock: Flock,
    frame: Framebuffer,
    pointer: Option<Pointer>,
    last_tick_ms: Option<f64>,
    fps: FrameCounter,
}

impl Session {
    pub fn new(width: u32, height: u32, seed: u64) -> Result<Self, FlockError> {
        let params = Parameters {
            window_width: width as f32,
            window_height: height as f32,
            ..Parameters::default()
        };
        let flock = Flock::new(params, seed)?;
        let mut frame = Framebuffer::new(width, height);
        draw_flock(&flock, &mut frame);
        Ok(Self {
            flock,
            frame,
            pointer: None,
            last_tick_ms: None,
            fps: FrameCounter::default(),
        })
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    pub fn pointer_state(&self) -> Option<&Pointer> {
        self.pointer.as_ref()
    }

    /// Advance to `now_ms` and redraw. Returns the simulated delta in seconds.
    ///
    /// A non-finite timestamp is rejected and leaves the clock untouched.
    pub fn tick(&mut self, now_ms: f64) -> Result<f32, StepError> {
        if !now_ms.is_finite() {
            return Err(StepError::InvalidDelta(now_ms as f32));
        }
        let dt = match self.last_tick_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_DT),
            None => 0.0,
        };
        self.flock.step(dt, self.pointer.as_ref())?;
        self.last_tick_ms = Some(now_ms);
        self.fps.record(now_ms);
        draw_flock(&self.flock, &mut self.frame);
        Ok(dt)
    }

    /// Frame rate over the last [`FPS_WINDOW`] frames, once per window.
    pub fn take_frame_rate(&mut self) -> Option<f64> {
        self.fps.report.take()
    }

    /// Follow a canvas resize. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let changed = self.flock.resize(width as f32, height as f32);
        if changed {
            self.frame.resize(width, height);
            draw_flock(&self.flock, &mut self.frame);
        }
        changed
    }

    /// Pointer position in canvas pixels plus the DOM `buttons` mask.
    pub fn pointer(&mut self, x: f32, y: f32, buttons: u32) {
        let (w, h) = (self.frame.width() as f32, self.frame.height() as f32);
        self.pointer = Some(Pointer::from_screen(x, y, w, h, buttons));
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = None;
    }

    pub fn restart(&mut self) {
        self.flock.restart();
        draw_flock(&self.flock, &mut self.frame);
    }

    pub fn set_param(&mut self, name: &str, value: f32) -> Result<(), ParamError> {
        let key: ParamKey = name.parse()?;
        self.flock.set_param(key, value)
    }

    pub fn param(&self, name: &str) -> Result<f32, ParamError> {
        let key: ParamKey = name.parse()?;
        Ok(self.flock.params().get(key))
    }

    pub fn params(&self) -> &Parameters {
        self.flock.params()
    }

    pub fn set_params(&mut self, params: Parameters) -> Result<(), ParamError> {
        self.flock.set_params(params)
    }

    pub fn stats(&self) -> FlockStats {
        self.flock.stats()
    }
}

#[derive(Default)]
struct FrameCounter {
    frames: u32,
    window_start_ms: Option<f64>,
    report: Option<f64>,
}

impl FrameCounter {
    fn record(&mut self, now_ms: f64) {
        let Some(start) = self.window_start_ms else {
            self.window_start_ms = Some(now_ms);
            return;
        };
        self.frames += 1;
        if self.frames < FPS_WINDOW {
            return;
        }
        let elapsed = now_ms - start;
        if elapsed > 0.0 {
            self.report = Some(self.frames as f64 * 1000.0 / elapsed);
        }
        self.frames = 0;
        self.window_start_ms = Some(now_ms);
    }
}
