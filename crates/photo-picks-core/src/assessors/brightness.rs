//! Brightness assessor.
//!
//! Scores how close the mean luminance sits to a target mid-tone: a photo
//! exposed around mid-gray scores 1.0, pure black or white scores 0.0.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Assessor, Photo};

/// Configuration for brightness scoring.
#[derive(Debug, Clone)]
pub struct BrightnessConfig {
    /// Target mean luminance on a 0.0-1.0 scale.
    pub target: f64,
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self { target: 0.5 }
    }
}

/// Mean-luminance brightness assessor.
pub struct BrightnessAssessor {
    config: BrightnessConfig,
}

impl BrightnessAssessor {
    /// Creates a brightness assessor with the given configuration.
    #[must_use]
    pub const fn new(config: BrightnessConfig) -> Self {
        Self { config }
    }
}

impl Default for BrightnessAssessor {
    fn default() -> Self {
        Self::new(BrightnessConfig::default())
    }
}

#[async_trait]
impl Assessor for BrightnessAssessor {
    fn name(&self) -> &'static str {
        "brightness"
    }

    async fn assess(&self, photo: &Photo) -> anyhow::Result<f64> {
        let image = Arc::clone(&photo.image);
        let target = self.config.target;
        let score =
            tokio::task::spawn_blocking(move || score_brightness(&image.to_luma8(), target))
                .await?;
        Ok(score)
    }
}

fn score_brightness(luma: &image::GrayImage, target: f64) -> f64 {
    let total = u64::from(luma.width()) * u64::from(luma.height());
    if total == 0 {
        return 0.0;
    }
    let sum: u64 = luma.pixels().map(|p| u64::from(p.0[0])).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / total as f64 / 255.0;
    // Linear falloff: at most half the scale away from target.
    1.0 - (mean - target).abs().min(0.5) * 2.0
}
