use std::path::Path;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{FamflowError, FamflowResult};

/// A rendered frame as RGBA8 pixels.
///
/// Frames coming out of [`CpuPainter`](crate::CpuPainter) are premultiplied. Every famflow
/// frame starts from an opaque background, so in practice alpha is 255 everywhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Opaque frame filled with one color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let px = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Copy `src` into this frame with its top-left corner at `(x, y)`, clipping at the edges.
    pub fn blit(&mut self, src: &FrameRGBA, x: u32, y: u32) {
        let dst_w = self.width as usize;
        let src_w = src.width as usize;
        let cols = (src.width.min(self.width.saturating_sub(x))) as usize;
        let rows = src.height.min(self.height.saturating_sub(y)) as usize;
        for row in 0..rows {
            let s = row * src_w * 4;
            let d = ((y as usize + row) * dst_w + x as usize) * 4;
            self.data[d..d + cols * 4].copy_from_slice(&src.data[s..s + cols * 4]);
        }
    }

    /// Per-channel linear blend toward `other`; both frames must share dimensions.
    pub fn blend(&self, other: &FrameRGBA, t: f64) -> FamflowResult<FrameRGBA> {
        if self.width != other.width || self.height != other.height {
            return Err(FamflowError::evaluation(format!(
                "cannot blend {}x{} with {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        let t = t.clamp(0.0, 1.0);
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8)
            .collect();
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: self.premultiplied,
        })
    }

    /// Write the frame as a PNG, creating the parent directory when missing.
    pub fn save_png(&self, path: &Path) -> FamflowResult<()> {
        use anyhow::Context as _;
        ensure_parent_dir(path)?;
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
