use image::RgbaImage;

use crate::{IconError, Result};

/// Smallest layer edge the engine accepts.
pub const MIN_SCALE: u32 = 4;
/// Largest layer edge the engine accepts (the icns `ic10` slot).
pub const MAX_SCALE: u32 = 1024;

/// Scales generated for a fresh icon set.
pub const DEFAULT_SCALES: &[u32] = &[16, 32, 48, 256];

/// The usual scales for complete icon sets.
pub const STANDARD_SCALES: &[u32] = &[16, 32, 48, 64, 128, 256, 512, 1024];

/// One square raster destined for an icon container.
///
/// The pixel buffer is RGBA8, row-major, top-down and holds exactly
/// `scale * scale * 4` bytes. The constructors enforce this; the writers
/// never resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLayer {
    scale: u32,
    compressed: bool,
    retina: bool,
    data: Vec<u8>,
}

impl IconLayer {
    /// Create a layer from a raw RGBA8 buffer.
    ///
    /// # Errors
    /// Returns an error when `scale` is outside `MIN_SCALE..=MAX_SCALE` or
    /// the buffer length does not match `scale * scale * 4`.
    pub fn new(scale: u32, compressed: bool, data: Vec<u8>) -> Result<Self> {
        if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            return Err(IconError::ScaleOutOfRange {
                scale,
                min: MIN_SCALE,
                max: MAX_SCALE,
            });
        }
        let expected = (scale * scale * 4) as usize;
        if data.len() != expected {
            return Err(IconError::LayerSizeMismatch {
                scale,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            scale,
            compressed,
            retina: false,
            data,
        })
    }

    /// Copy the pixels out of an `image` buffer. The image must already be
    /// square and at its final resolution.
    ///
    /// # Errors
    /// Returns an error when the image is not square or the edge length is
    /// out of range.
    pub fn from_image(image: &RgbaImage, compressed: bool) -> Result<Self> {
        if image.width() != image.height() {
            return Err(IconError::LayerNotSquare {
                width: image.width(),
                height: image.height(),
            });
        }
        Self::new(image.width(), compressed, image.as_raw().clone())
    }

    /// Mark this layer as a double-density ("@2x") variant. Only the icns
    /// element lookup consumes this.
    pub fn with_retina(mut self, retina: bool) -> Self {
        self.retina = retina;
        self
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn is_retina(&self) -> bool {
        self.retina
    }

    /// The raw RGBA8 pixel buffer, row-major, top-down.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA tuple at (x, y), top-down coordinates.
    ///
    /// # Panics
    /// Panics when (x, y) lies outside the layer.
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.scale + x) * 4) as usize;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2], self.data[idx + 3]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length_is_enforced() {
        let result = IconLayer::new(16, false, vec![0; 16 * 16 * 4]);
        assert!(result.is_ok());

        let result = IconLayer::new(16, false, vec![0; 16 * 16 * 3]);
        assert!(matches!(
            result,
            Err(IconError::LayerSizeMismatch {
                scale: 16,
                expected: 1024,
                actual: 768
            })
        ));
    }

    #[test]
    fn test_scale_range_is_enforced() {
        assert!(matches!(
            IconLayer::new(2, false, vec![0; 2 * 2 * 4]),
            Err(IconError::ScaleOutOfRange { scale: 2, .. })
        ));
        assert!(matches!(
            IconLayer::new(2048, false, vec![0; 2048 * 2048 * 4]),
            Err(IconError::ScaleOutOfRange { scale: 2048, .. })
        ));
    }

    #[test]
    fn test_from_image_rejects_non_square() {
        let image = RgbaImage::new(16, 32);
        assert!(matches!(
            IconLayer::from_image(&image, false),
            Err(IconError::LayerNotSquare { width: 16, height: 32 })
        ));
    }

    #[test]
    fn test_scale_tables() {
        assert!(DEFAULT_SCALES.iter().all(|scale| STANDARD_SCALES.contains(scale)));
        assert!(STANDARD_SCALES.iter().all(|&scale| (MIN_SCALE..=MAX_SCALE).contains(&scale)));
        assert!(STANDARD_SCALES.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_pixel_accessor() {
        let mut data = vec![0; 8 * 8 * 4];
        let idx = (3 * 8 + 5) * 4;
        data[idx..idx + 4].copy_from_slice(&[1, 2, 3, 4]);
        let layer = IconLayer::new(8, false, data).unwrap();
        assert_eq!(layer.rgba(5, 3), [1, 2, 3, 4]);
        assert_eq!(layer.rgba(0, 0), [0, 0, 0, 0]);
    }
}
