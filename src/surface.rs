//! The reusable raster surface every capture draws into.
//!
//! A [`RasterSurface`] is an RGBA buffer of fixed dimensions. A batch run
//! allocates one surface and overwrites it for each capture, so captures
//! must happen one at a time; the `&mut` receivers enforce that.

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::{encoding::OutputEncoding, error::ExtractError};

const BYTES_PER_PIXEL: usize = 4;

/// Off-screen RGBA surface sized to a request's target dimensions.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// Allocate a surface. Both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> Result<Self, ExtractError> {
        if width == 0 || height == 0 {
            return Err(ExtractError::InvalidDimensions { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
        })
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)` of the surface.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Current contents of the surface.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Draw a decoded image, stretching it to fill the surface.
    pub fn draw_image(&mut self, image: &DynamicImage) -> Result<(), ExtractError> {
        let (width, height) = self.dimensions();
        if image.width() == 0 || image.height() == 0 {
            return Err(ExtractError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        if image.width() == width && image.height() == height {
            let rgba = image.to_rgba8();
            self.pixels.copy_from_slice(rgba.as_raw());
        } else {
            let resized = image.resize_exact(width, height, FilterType::Triangle).into_rgba8();
            self.pixels.copy_from_slice(resized.as_raw());
        }
        Ok(())
    }

    /// Copy packed RGBA rows whose stride may include padding.
    ///
    /// FFmpeg frames frequently carry per-row padding (stride > width × 4);
    /// only the first `width × 4` bytes of each row are copied.
    pub fn copy_rgba_rows(&mut self, data: &[u8], stride: usize) -> Result<(), ExtractError> {
        let (width, height) = self.dimensions();
        let row_bytes = width as usize * BYTES_PER_PIXEL;
        let required = stride * (height as usize - 1) + row_bytes;

        if stride < row_bytes || data.len() < required {
            return Err(ExtractError::DecodeError(format!(
                "frame buffer too small for a {width}x{height} surface \
                 (stride {stride}, {} bytes)",
                data.len(),
            )));
        }

        for (row, target) in self.pixels.chunks_exact_mut(row_bytes).enumerate() {
            let start = row * stride;
            target.copy_from_slice(&data[start..start + row_bytes]);
        }
        Ok(())
    }

    /// Encode the current contents.
    pub fn encode(&self, encoding: OutputEncoding) -> Result<Vec<u8>, ExtractError> {
        encoding.encode(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(RasterSurface::new(0, 10).is_err());
        assert!(RasterSurface::new(10, 0).is_err());
    }

    #[test]
    fn draw_image_rescales_to_surface() {
        let mut surface = RasterSurface::new(4, 2).unwrap();
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255])));
        surface.draw_image(&source).unwrap();
        assert_eq!(surface.dimensions(), (4, 2));
        assert_eq!(surface.pixels().get_pixel(3, 1), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn copy_rgba_rows_strips_padding() {
        let mut surface = RasterSurface::new(2, 2).unwrap();
        // Two rows of 2 pixels, each padded to 12 bytes.
        let mut data = vec![0_u8; 24];
        data[0..8].copy_from_slice(&[1, 1, 1, 1, 2, 2, 2, 2]);
        data[12..20].copy_from_slice(&[3, 3, 3, 3, 4, 4, 4, 4]);
        surface.copy_rgba_rows(&data, 12).unwrap();
        assert_eq!(surface.pixels().get_pixel(1, 0), &Rgba([2, 2, 2, 2]));
        assert_eq!(surface.pixels().get_pixel(0, 1), &Rgba([3, 3, 3, 3]));
    }

    #[test]
    fn copy_rgba_rows_rejects_short_buffer() {
        let mut surface = RasterSurface::new(2, 2).unwrap();
        assert!(surface.copy_rgba_rows(&[0; 10], 8).is_err());
    }
}
