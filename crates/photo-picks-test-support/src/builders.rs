//! Synthetic image builders for testing.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use photo_picks_core::domain::Photo;

/// Builder for creating synthetic test photos.
///
/// Provides convenience methods for generating images with specific
/// characteristics (sharp, flat, colorful, off-center subject).
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a high-contrast checkerboard pattern (very sharp edges).
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> Photo {
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        Photo::new("synthetic://checkerboard", DynamicImage::ImageLuma8(img))
    }

    /// Creates a uniform gray image (no edges, single color).
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, level: u8) -> Photo {
        let img = GrayImage::from_pixel(width, height, Luma([level]));
        Photo::new("synthetic://uniform_gray", DynamicImage::ImageLuma8(img))
    }

    /// Creates a smooth horizontal luminance gradient.
    #[must_use]
    pub fn gradient(width: u32, height: u32) -> Photo {
        let img = GrayImage::from_fn(width, height, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            Luma([(x * 255 / width.max(1)) as u8])
        });
        Photo::new("synthetic://gradient", DynamicImage::ImageLuma8(img))
    }

    /// Creates a colorful block pattern (high color variety).
    #[must_use]
    pub fn color_blocks(width: u32, height: u32) -> Photo {
        let img = RgbImage::from_fn(width, height, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgb([
                ((x / 16) * 40 % 256) as u8,
                ((y / 16) * 40 % 256) as u8,
                (((x + y) / 16) * 40 % 256) as u8,
            ])
        });
        Photo::new("synthetic://color_blocks", DynamicImage::ImageRgb8(img))
    }

    /// Creates a bright square subject on a dark field, centered at the
    /// normalized coordinates `(cx, cy)`.
    #[must_use]
    pub fn subject_at(width: u32, height: u32, cx: f64, cy: f64) -> Photo {
        #[allow(clippy::cast_possible_truncation)]
        let (sx, sy) = ((cx * f64::from(width)) as i64, (cy * f64::from(height)) as i64);
        let half = i64::from(width.min(height) / 12);
        let img = GrayImage::from_fn(width, height, |x, y| {
            let (x, y) = (i64::from(x), i64::from(y));
            if (x - sx).abs() < half && (y - sy).abs() < half {
                Luma([255u8])
            } else {
                Luma([12u8])
            }
        });
        Photo::new("synthetic://subject", DynamicImage::ImageLuma8(img))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_produce_requested_dimensions() {
        let photo = SyntheticImageBuilder::checkerboard(64, 48);
        assert_eq!((photo.width, photo.height), (64, 48));

        let photo = SyntheticImageBuilder::color_blocks(32, 32);
        assert_eq!((photo.width, photo.height), (32, 32));
    }
}
