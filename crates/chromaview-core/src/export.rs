//! PNG export for the capture artifacts.

use std::path::Path;

use image::{GrayImage, ImageFormat, ImageResult, Luma, RgbaImage};

use crate::depth::DepthBuffer;
use crate::image::ChromadepthImage;

/// Conventional filename for the composited chromadepth visualization.
pub const CHROMADEPTH_FILENAME: &str = "chromadepth-visualization.png";

/// Conventional filename for the raw grayscale depth render.
pub const DEPTH_MAP_FILENAME: &str = "depth-map.png";

impl ChromadepthImage {
    /// Write this image as a lossless RGBA PNG.
    pub fn save_png(&self, path: &Path) -> ImageResult<()> {
        let img = RgbaImage::from_raw(self.width(), self.height(), self.as_rgba_bytes().to_vec())
            .expect("pixel length matches dimensions");
        img.save_with_format(path, ImageFormat::Png)
    }
}

impl DepthBuffer {
    /// Write the raw depth samples as an 8-bit grayscale PNG.
    pub fn save_grayscale_png(&self, path: &Path) -> ImageResult<()> {
        let img = GrayImage::from_fn(self.width(), self.height(), |x, y| Luma([self.sample(x, y)]));
        img.save_with_format(path, ImageFormat::Png)
    }
}
