use crate::foundation::error::{FamflowError, FamflowResult};

pub use kurbo::{Point, Rect, Vec2};

/// Absolute 0-based frame index in output video space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> FamflowResult<Self> {
        if den == 0 {
            return Err(FamflowError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FamflowError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Presentation timestamp of `frame` in seconds.
    pub fn frame_time_secs(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * self.frame_duration_secs()
    }

    /// Number of frames needed to cover `secs`, rounding partial frames up.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64() - 1e-9).ceil().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Smallest canvas with even dimensions that covers `width x height` pixels.
    ///
    /// yuv420p output needs even sides, so every canvas the drawers create goes through here.
    pub fn covering(width: f64, height: f64) -> FamflowResult<Self> {
        fn even_ceil(v: f64) -> FamflowResult<u32> {
            if !v.is_finite() || v < 0.0 {
                return Err(FamflowError::evaluation(format!(
                    "canvas extent must be finite and >= 0, got {v}"
                )));
            }
            let px = (v.ceil() as u64).max(2);
            let px = px + (px % 2);
            u32::try_from(px)
                .map_err(|_| FamflowError::evaluation(format!("canvas extent {px} is too large")))
        }
        Ok(Self {
            width: even_ceil(width)?,
            height: even_ceil(height)?,
        })
    }
}

/// Opaque 8-bit RGB color, written as `[r, g, b]` in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        [c.r, c.g, c.b]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
