//! Frame export: single PNG snapshots and animated GIFs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use boids_core::Framebuffer;

/// GIF quantizer speed, 1 (best) to 30 (fastest).
const GIF_SPEED: i32 = 10;

pub fn write_png(path: &Path, fb: &Framebuffer) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), fb.width(), fb.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().context("png write_header failed")?;
    writer
        .write_image_data(&fb.to_rgba())
        .context("png write_image_data failed")?;
    writer.finish().context("png finish failed")?;
    Ok(())
}

/// Streams frames into a looping GIF.
pub struct GifRecorder {
    encoder: gif::Encoder<BufWriter<File>>,
    width: u16,
    height: u16,
    /// Frame delay in hundredths of a second.
    delay: u16,
    frames: usize,
}

impl GifRecorder {
    pub fn create(path: &Path, width: u32, height: u32, delay: u16) -> Result<Self> {
        let width = u16::try_from(width).context("GIF width is limited to 65535 px")?;
        let height = u16::try_from(height).context("GIF height is limited to 65535 px")?;
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut encoder = gif::Encoder::new(BufWriter::new(file), width, height, &[])
            .context("gif header failed")?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .context("gif repeat failed")?;
        Ok(Self {
            encoder,
            width,
            height,
            delay: delay.max(1),
            frames: 0,
        })
    }

    pub fn push(&mut self, fb: &Framebuffer) -> Result<()> {
        anyhow::ensure!(
            fb.width() == u32::from(self.width) && fb.height() == u32::from(self.height),
            "frame is {}x{}, GIF is {}x{}",
            fb.width(),
            fb.height(),
            self.width,
            self.height
        );
        let mut rgba = fb.to_rgba();
        let mut frame = gif::Frame::from_rgba_speed(self.width, self.height, &mut rgba, GIF_SPEED);
        frame.delay = self.delay;
        self.encoder
            .write_frame(&frame)
            .context("gif write_frame failed")?;
        self.frames += 1;
        Ok(())
    }

    /// Write the trailer and flush. Returns the number of frames written.
    pub fn finish(self) -> Result<usize> {
        let mut writer = self.encoder.into_inner().context("gif trailer failed")?;
        writer.flush().context("gif flush failed")?;
        Ok(self.frames)
    }
}

/// GIF delay for frames `every` steps of `dt` seconds apart, in hundredths of a second.
pub fn gif_delay(dt: f32, every: u32) -> u16 {
    let centis = (dt * every as f32 * 100.0).round();
    centis.clamp(1.0, u16::MAX as f32) as u16
}
