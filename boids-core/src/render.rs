//! CPU framebuffer and flock drawing.
//!
//! Pixels are packed `0x00RRGGBB` (XRGB8888). Hosts read them back as RGBA bytes with
//! [`Framebuffer::to_rgba`]: the page hands them to a canvas `ImageData`, the CLI encodes them
//! as PNG or GIF frames.

use alloc::vec;
use alloc::vec::Vec;

use crate::flock::Flock;
use crate::input::world_to_screen;
use crate::math::Vec2;

/// Scene background.
pub const BACKGROUND: (u8, u8, u8) = (20, 20, 30);

/// Saturation and lightness of boid colours; the hue comes from the heading.
const BOID_SATURATION: f32 = 0.95;
const BOID_LIGHTNESS: f32 = 0.7;

#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    draw_color: u32,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize)],
            draw_color: 0x00FF_FFFF,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Resize and clear to black. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.resize((width as usize) * (height as usize), 0);
        self.pixels.fill(0);
    }

    pub fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.draw_color = pack(r, g, b);
    }

    pub fn background(&mut self, r: u8, g: u8, b: u8) {
        self.pixels.fill(pack(r, g, b));
    }

    pub fn point(&mut self, x: i32, y: i32) {
        let (w, h) = (self.width as i32, self.height as i32);
        if x >= 0 && x < w && y >= 0 && y < h {
            self.pixels[(y * w + x) as usize] = self.draw_color;
        }
    }

    /// Bresenham line, clipped per pixel.
    pub fn line(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.point(x0, y0);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Filled triangle. Winding-invariant; degenerate triangles draw nothing.
    pub fn triangle(&mut self, v0: (i32, i32), v1: (i32, i32), v2: (i32, i32)) {
        let (w, h) = (self.width as i32, self.height as i32);
        if w <= 0 || h <= 0 {
            return;
        }

        let area = tri_edge(v0, v1, v2);
        if area == 0 {
            return;
        }

        // Bounding box (inclusive), clipped to the framebuffer.
        let min_x = v0.0.min(v1.0).min(v2.0).max(0);
        let max_x = v0.0.max(v1.0).max(v2.0).min(w - 1);
        let min_y = v0.1.min(v1.1).min(v2.1).max(0);
        let max_y = v0.1.max(v1.1).max(v2.1).min(h - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        // Normalize edge signs so "inside" is >= 0 whatever the winding.
        let sign = if area > 0 { 1 } else { -1 };
        let color = self.draw_color;

        for y in min_y..=max_y {
            let row = (y as usize) * (w as usize);
            for x in min_x..=max_x {
                let p = (x, y);
                let w0 = tri_edge(v1, v2, p) * sign;
                let w1 = tri_edge(v2, v0, p) * sign;
                let w2 = tri_edge(v0, v1, p) * sign;
                if w0 >= 0 && w1 >= 0 && w2 >= 0 {
                    self.pixels[row + x as usize] = color;
                }
            }
        }
    }

    /// RGBA bytes, row-major, fully opaque.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &px in &self.pixels {
            out.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, px as u8, 255]);
        }
        out
    }

    /// RGB bytes, row-major.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &px in &self.pixels {
            out.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, px as u8]);
        }
        out
    }
}

#[inline]
fn pack(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
fn tri_edge(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> i64 {
    (c.0 as i64 - a.0 as i64) * (b.1 as i64 - a.1 as i64)
        - (c.1 as i64 - a.1 as i64) * (b.0 as i64 - a.0 as i64)
}

/// HSL to RGB. `h` in degrees (any value, wrapped), `s` and `l` in `0..=1`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let h = libm::fmodf(libm::fmodf(h, 360.0) + 360.0, 360.0) / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        let v = to_byte(l);
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        to_byte(hue_channel(p, q, h + 1.0 / 3.0)),
        to_byte(hue_channel(p, q, h)),
        to_byte(hue_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(v: f32) -> u8 {
    libm::roundf(v.clamp(0.0, 1.0) * 255.0) as u8
}

/// Paint the background and every boid. The framebuffer is one pixel per world unit.
pub fn draw_flock(flock: &Flock, fb: &mut Framebuffer) {
    let (r, g, b) = BACKGROUND;
    fb.background(r, g, b);

    let (w, h) = (fb.width() as f32, fb.height() as f32);
    let to_screen = |p: Vec2| {
        let (x, y) = world_to_screen(p, w, h);
        (libm::roundf(x) as i32, libm::roundf(y) as i32)
    };

    for boid in flock.boids() {
        let (r, g, b) = hsl_to_rgb(boid.hue, BOID_SATURATION, BOID_LIGHTNESS);
        fb.set_color(r, g, b);
        let [tip, left, right] = boid.triangle();
        fb.triangle(to_screen(tip), to_screen(left), to_screen(right));
    }
}
