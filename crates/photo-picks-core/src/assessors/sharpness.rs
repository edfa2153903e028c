//! Sharpness assessor.
//!
//! Scores focus quality via the variance of the Laplacian over the grayscale
//! image: sharp images have strong second-derivative responses at edges,
//! blurry ones do not. Variance is mapped against a reference threshold so
//! the score saturates at 1.0 for anything comfortably sharp.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Assessor, Photo};

/// Configuration for sharpness scoring.
#[derive(Debug, Clone)]
pub struct SharpnessConfig {
    /// Laplacian variance considered fully sharp.
    pub sharp_variance: f64,
}

impl Default for SharpnessConfig {
    fn default() -> Self {
        Self {
            sharp_variance: 100.0,
        }
    }
}

/// Laplacian-variance sharpness assessor.
pub struct SharpnessAssessor {
    config: SharpnessConfig,
}

impl SharpnessAssessor {
    /// Creates a sharpness assessor with the given configuration.
    #[must_use]
    pub const fn new(config: SharpnessConfig) -> Self {
        Self { config }
    }
}

impl Default for SharpnessAssessor {
    fn default() -> Self {
        Self::new(SharpnessConfig::default())
    }
}

#[async_trait]
impl Assessor for SharpnessAssessor {
    fn name(&self) -> &'static str {
        "sharpness"
    }

    fn default_weight(&self) -> f64 {
        1.5
    }

    async fn assess(&self, photo: &Photo) -> anyhow::Result<f64> {
        let image = Arc::clone(&photo.image);
        let sharp_variance = self.config.sharp_variance;
        let score = tokio::task::spawn_blocking(move || {
            let variance = laplacian_variance(&image.to_luma8());
            (variance / sharp_variance).min(1.0)
        })
        .await?;
        Ok(score)
    }
}

/// Variance of the 4-neighbour Laplacian response.
fn laplacian_variance(luma: &image::GrayImage) -> f64 {
    let (width, height) = luma.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let at = |x: u32, y: u32| f64::from(luma.get_pixel(x, y).0[0]);

    let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let lap = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            responses.push(lap);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let n = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / n;
    responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn checkerboard(size: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_flat_image_has_zero_variance() {
        let flat = GrayImage::from_pixel(32, 32, Luma([128]));
        assert_eq!(laplacian_variance(&flat), 0.0);
    }

    #[test]
    fn test_checkerboard_much_sharper_than_flat() {
        let sharp = laplacian_variance(&checkerboard(32));
        assert!(sharp > 1000.0, "checkerboard variance was {sharp}");
    }

    #[test]
    fn test_tiny_image_scores_zero() {
        assert_eq!(laplacian_variance(&GrayImage::new(2, 2)), 0.0);
    }

    #[tokio::test]
    async fn test_assess_saturates_at_one() {
        let assessor = SharpnessAssessor::default();
        let photo = Photo::new(
            "sharp",
            image::DynamicImage::ImageLuma8(checkerboard(64)),
        );
        let score = assessor.assess(&photo).await.unwrap();
        assert_eq!(score, 1.0);
    }
}
