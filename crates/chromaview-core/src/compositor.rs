//! Per-pixel remap of a depth buffer into a chromadepth image.

use crate::depth::DepthBuffer;
use crate::image::ChromadepthImage;
use crate::ramp::ColorRamp;

/// Remap every depth sample through the ramp into an RGBA image.
///
/// Pure transformation: deterministic for identical input, no rendering
/// side effects. Each output pixel is `ramp.map` of the corresponding depth
/// sample with alpha fully opaque. Linear in pixel count; pixels carry no
/// data dependency on each other.
pub fn composite(buffer: &DepthBuffer, ramp: &ColorRamp) -> ChromadepthImage {
    let pixel_count = buffer.width() as usize * buffer.height() as usize;
    let mut pixels = Vec::with_capacity(pixel_count * 4);
    for depth in buffer.samples() {
        let [r, g, b] = ramp.map(depth);
        pixels.extend_from_slice(&[r, g, b, u8::MAX]);
    }
    ChromadepthImage::new(buffer.width(), buffer.height(), pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::CHANNELS_PER_PIXEL;
    use crate::ramp::RampPolarity;

    fn uniform_buffer(depth: u8, width: u32, height: u32) -> DepthBuffer {
        let mut bytes = vec![0u8; width as usize * height as usize * CHANNELS_PER_PIXEL];
        for px in bytes.chunks_exact_mut(CHANNELS_PER_PIXEL) {
            px[0] = depth;
            px[3] = u8::MAX;
        }
        DepthBuffer::from_raw(bytes, width, height).unwrap()
    }

    #[test]
    fn test_composite_preserves_dimensions() {
        let buffer = uniform_buffer(0, 7, 3);
        let image = composite(&buffer, &ColorRamp::default());
        assert_eq!(image.width(), buffer.width());
        assert_eq!(image.height(), buffer.height());
    }

    #[test]
    fn test_uniform_depth_composites_to_uniform_ramp_color() {
        let ramp = ColorRamp::new(RampPolarity::NearWarm);
        let buffer = uniform_buffer(90, 4, 4);
        let image = composite(&buffer, &ramp);

        let [r, g, b] = ramp.map(90);
        for y in 0..image.height() {
            for x in 0..image.width() {
                assert_eq!(image.pixel(x, y), [r, g, b, 255]);
            }
        }
    }

    #[test]
    fn test_background_depth_composites_to_spectrum_end() {
        // An empty capture reads back the clear value everywhere: depth 255.
        let ramp = ColorRamp::new(RampPolarity::NearWarm);
        let buffer = uniform_buffer(255, 2, 2);
        let image = composite(&buffer, &ramp);
        let [r, g, b] = ramp.map(255);
        assert_eq!(image.pixel(1, 1), [r, g, b, 255]);
    }

    #[test]
    fn test_composite_output_is_fully_opaque() {
        let mut bytes = vec![0u8; 3 * 2 * CHANNELS_PER_PIXEL];
        for (i, px) in bytes.chunks_exact_mut(CHANNELS_PER_PIXEL).enumerate() {
            px[0] = (i * 40) as u8;
            // Alpha noise in the source must not leak through.
            px[3] = 3;
        }
        let buffer = DepthBuffer::from_raw(bytes, 3, 2).unwrap();
        let image = composite(&buffer, &ColorRamp::default());
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(image.pixel(x, y)[3], 255);
            }
        }
    }

    #[test]
    fn test_composite_maps_each_pixel_independently() {
        let mut bytes = vec![0u8; 2 * CHANNELS_PER_PIXEL];
        bytes[0] = 0;
        bytes[CHANNELS_PER_PIXEL] = 255;
        let buffer = DepthBuffer::from_raw(bytes, 2, 1).unwrap();

        let ramp = ColorRamp::default();
        let image = composite(&buffer, &ramp);
        let [r0, g0, b0] = ramp.map(0);
        let [r1, g1, b1] = ramp.map(255);
        assert_eq!(image.pixel(0, 0), [r0, g0, b0, 255]);
        assert_eq!(image.pixel(1, 0), [r1, g1, b1, 255]);
    }
}
