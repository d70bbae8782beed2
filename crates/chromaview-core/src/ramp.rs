//! Chromadepth color ramp: depth scalar to spectral hue.
//!
//! Saturation and value are held constant across the ramp so only hue
//! encodes depth, and hue traverses the visible spectrum monotonically.
//! Depth ordering is therefore recoverable from hue ordering alone.

use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// Hue keyframe angles in degrees, red through violet.
///
/// Spaced to traverse the spectrum without wrapping past red: the magenta
/// sector above 275 degrees would fold back toward the warm end and break
/// hue ordering.
const KEYFRAME_HUES: [f32; 7] = [0.0, 30.0, 60.0, 120.0, 180.0, 240.0, 275.0];

/// Which end of the depth range maps to the warm end of the spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RampPolarity {
    /// Depth 0 maps to red, depth 255 to violet.
    ///
    /// The chromadepth convention for a standard z-buffer, where smaller
    /// samples are closer to the camera.
    #[default]
    NearWarm,
    /// Depth 0 maps to violet, depth 255 to red.
    NearCool,
}

/// Maps an 8-bit depth sample onto a spectral color.
///
/// [`ColorRamp::map`] is pure and total: every input in [0, 255] produces a
/// valid RGB triple, and identical inputs produce identical outputs. Callers
/// clamp out-of-range scalars before quantizing to `u8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRamp {
    keyframes: [[u8; 3]; KEYFRAME_HUES.len()],
}

impl ColorRamp {
    /// Build the ramp for the given polarity.
    ///
    /// Keyframe colors are derived from the hue angles at full saturation
    /// and value, then quantized to 8-bit sRGB.
    pub fn new(polarity: RampPolarity) -> Self {
        let mut keyframes = KEYFRAME_HUES.map(|hue| {
            let rgb = Srgb::from_color(Hsv::new_srgb(hue, 1.0, 1.0)).into_format::<u8>();
            [rgb.red, rgb.green, rgb.blue]
        });
        if polarity == RampPolarity::NearCool {
            keyframes.reverse();
        }
        Self { keyframes }
    }

    /// Map a depth sample to an RGB triple.
    ///
    /// Linear interpolation between the two nearest keyframes; 0 and 255
    /// land exactly on the two extreme keyframes.
    pub fn map(&self, depth: u8) -> [u8; 3] {
        let last = self.keyframes.len() - 1;
        let scaled = depth as f32 / 255.0 * last as f32;
        let lower = (scaled.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let frac = scaled - lower as f32;

        let a = self.keyframes[lower];
        let b = self.keyframes[upper];
        std::array::from_fn(|ch| {
            (a[ch] as f32 + (b[ch] as f32 - a[ch] as f32) * frac).round() as u8
        })
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::new(RampPolarity::default())
    }
}
